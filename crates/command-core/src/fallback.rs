//! Ordered provider fallback with per-call timeout.

use crate::error::{FallbackError, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Resolved media resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub url: String,
    pub title: Option<String>,
}

/// One external source able to satisfy a query.
#[async_trait]
pub trait Provider<T>: Send + Sync {
    /// Provider name used in logs and error reports.
    fn name(&self) -> &str;

    /// Fetch the resource for `query`.
    async fn fetch(&self, query: &str) -> Result<T, ProviderError>;
}

/// Outcome of one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed(String),
}

/// Record of one provider call within a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub outcome: AttemptOutcome,
}

impl ProviderAttempt {
    /// Failure reason, if this attempt failed.
    pub fn failure(&self) -> Option<&str> {
        match &self.outcome {
            AttemptOutcome::Succeeded => None,
            AttemptOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// Successful resolution.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    /// Name of the provider that answered.
    pub provider: String,
    /// Every call made, in order, ending with the successful one.
    pub attempts: Vec<ProviderAttempt>,
}

/// Tries providers strictly in order and returns the first success.
///
/// Each provider is called at most once per resolution.
#[derive(Debug, Clone)]
pub struct ProviderFallback {
    timeout: Duration,
}

impl ProviderFallback {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Resolve `query` against `providers` in order.
    pub async fn resolve<T>(
        &self,
        query: &str,
        providers: &[Arc<dyn Provider<T>>],
    ) -> Result<Resolved<T>, FallbackError>
    where
        T: Send + 'static,
    {
        if providers.is_empty() {
            return Err(FallbackError::NoProviders);
        }

        let mut attempts = Vec::with_capacity(providers.len());

        for provider in providers {
            let name = provider.name().to_string();
            debug!(provider = %name, "Trying provider");

            let result = match timeout(self.timeout, provider.fetch(query)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.timeout)),
            };

            match result {
                Ok(value) => {
                    info!(provider = %name, attempt = attempts.len() + 1, "Provider resolved");
                    attempts.push(ProviderAttempt {
                        provider: name.clone(),
                        outcome: AttemptOutcome::Succeeded,
                    });
                    return Ok(Resolved {
                        value,
                        provider: name,
                        attempts,
                    });
                }
                Err(e) => {
                    warn!(provider = %name, error = %e, "Provider failed");
                    attempts.push(ProviderAttempt {
                        provider: name,
                        outcome: AttemptOutcome::Failed(e.to_string()),
                    });
                }
            }
        }

        Err(FallbackError::Exhausted { attempts })
    }
}

impl Default for ProviderFallback {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}
