//! HTTP JSON download providers.

use crate::config::ProviderConfig;
use async_trait::async_trait;
use command_core::{Provider, ProviderError, ResourceDescriptor};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Provider that calls a JSON API and reads the result through JSON pointers.
pub struct HttpJsonProvider {
    client: Client,
    config: ProviderConfig,
}

impl HttpJsonProvider {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    fn request_url(&self, query: &str) -> String {
        self.config
            .url_template
            .replace("{url}", &urlencoding::encode(query))
    }

    fn extract(&self, body: &Value) -> Result<ResourceDescriptor, ProviderError> {
        if let Some(pointer) = &self.config.success_pointer {
            if body.pointer(pointer) != Some(&Value::Bool(true)) {
                return Err(ProviderError::InvalidResponse(format!(
                    "{} reported failure",
                    self.config.name
                )));
            }
        }

        let url = body
            .pointer(&self.config.url_pointer)
            .and_then(Value::as_str)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::InvalidResponse(format!(
                    "no download link from {}",
                    self.config.name
                ))
            })?;

        let title = self
            .config
            .title_pointer
            .as_deref()
            .and_then(|p| body.pointer(p))
            .and_then(Value::as_str)
            .map(String::from);

        Ok(ResourceDescriptor {
            url: url.to_string(),
            title,
        })
    }
}

#[async_trait]
impl Provider<ResourceDescriptor> for HttpJsonProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self, query: &str) -> Result<ResourceDescriptor, ProviderError> {
        debug!(provider = %self.config.name, "Requesting download link");
        let response = self.client.get(self.request_url(query)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        self.extract(&body)
    }
}

/// Build providers in configured order.
pub fn from_config(
    client: &Client,
    configs: &[ProviderConfig],
) -> Vec<Arc<dyn Provider<ResourceDescriptor>>> {
    configs
        .iter()
        .cloned()
        .map(|c| Arc::new(HttpJsonProvider::new(client.clone(), c)) as Arc<dyn Provider<ResourceDescriptor>>)
        .collect()
}
