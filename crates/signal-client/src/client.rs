//! Signal HTTP client.

use crate::error::SignalError;
use crate::types::*;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Signal CLI REST API client.
#[derive(Clone)]
pub struct SignalClient {
    client: Client,
    base_url: String,
    phone_number: String,
}

impl SignalClient {
    /// Create a new Signal client.
    pub fn new(
        base_url: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Result<Self, SignalError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            phone_number: phone_number.into(),
        })
    }

    /// Get the configured phone number.
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Check if the Signal API is healthy.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Receive pending messages.
    #[instrument(skip(self))]
    pub async fn receive(&self) -> Result<Vec<IncomingMessage>, SignalError> {
        let response = self
            .client
            .get(format!(
                "{}/v1/receive/{}",
                self.base_url,
                encode(&self.phone_number)
            ))
            .send()
            .await?;

        let messages: Vec<IncomingMessage> = Self::check(response).await?.json().await?;
        debug!("Received {} messages", messages.len());
        Ok(messages)
    }

    /// Build a send request from this account to `recipient`.
    pub fn request(&self, recipient: &str, message: impl Into<String>) -> SendMessageRequest {
        SendMessageRequest {
            message: message.into(),
            number: Some(self.phone_number.clone()),
            recipients: Some(vec![recipient.to_string()]),
            ..Default::default()
        }
    }

    /// Send a prepared request. Returns the sent message timestamp.
    #[instrument(skip(self, request), fields(attachments = request.base64_attachments.len()))]
    pub async fn send_request(&self, request: SendMessageRequest) -> Result<Option<i64>, SignalError> {
        let response = self
            .client
            .post(format!("{}/v2/send", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Send failed: {}", msg);
            return Err(SignalError::SendFailed(msg));
        }

        // Older bridge versions answer 201 with an empty body.
        let body = response.text().await.unwrap_or_default();
        let timestamp = serde_json::from_str::<SendMessageResponse>(&body)
            .ok()
            .and_then(|r| r.timestamp)
            .map(|t| t.0);

        debug!(?timestamp, "Sent message");
        Ok(timestamp)
    }

    /// React to a message with an emoji.
    #[instrument(skip(self))]
    pub async fn react(
        &self,
        recipient: &str,
        target_author: &str,
        target_timestamp: i64,
        emoji: &str,
    ) -> Result<(), SignalError> {
        let request = ReactionRequest {
            reaction: emoji.to_string(),
            recipient: recipient.to_string(),
            target_author: target_author.to_string(),
            timestamp: target_timestamp,
        };

        let response = self
            .client
            .post(format!(
                "{}/v1/reactions/{}",
                self.base_url,
                encode(&self.phone_number)
            ))
            .json(&request)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Delete a message this account sent.
    #[instrument(skip(self))]
    pub async fn remote_delete(&self, recipient: &str, timestamp: i64) -> Result<(), SignalError> {
        let request = RemoteDeleteRequest {
            recipient: recipient.to_string(),
            timestamp,
        };

        let response = self
            .client
            .delete(format!(
                "{}/v1/remote-delete/{}",
                self.base_url,
                encode(&self.phone_number)
            ))
            .json(&request)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// URL of a contact's avatar on the bridge.
    pub fn avatar_url(&self, contact: &str) -> String {
        format!(
            "{}/v1/contacts/{}/{}/avatar",
            self.base_url,
            encode(&self.phone_number),
            encode(contact)
        )
    }

    /// Check that a contact has an avatar, returning its URL.
    #[instrument(skip(self))]
    pub async fn avatar(&self, contact: &str) -> Result<String, SignalError> {
        let url = self.avatar_url(contact);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SignalError::NoAvatar(contact.to_string()));
        }
        Self::check(response).await?;
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response, SignalError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let msg = response.text().await.unwrap_or_default();
            Err(SignalError::Api(msg))
        }
    }
}
