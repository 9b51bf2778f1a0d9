//! Messaging gateway backed by the Signal REST bridge.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use command_core::{
    GatewayError, MediaSource, MessageHandle, MessageRef, MessagingGateway, OutboundMessage,
    SendOptions,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use signal_client::{SignalClient, SignalError};
use tracing::{debug, instrument};

/// [`MessagingGateway`] over a [`SignalClient`].
#[derive(Clone)]
pub struct SignalGateway {
    signal: SignalClient,
    http: Client,
}

impl SignalGateway {
    pub fn new(signal: SignalClient, http: Client) -> Self {
        Self { signal, http }
    }

    /// Turn media into a data URI attachment.
    async fn attachment(&self, media: &MediaSource) -> Result<String, GatewayError> {
        let (mime, data) = match media {
            MediaSource::Bytes { mime, data } => (mime.clone(), data.clone()),
            MediaSource::Url(url) => self.download(url).await?,
        };
        Ok(format!("data:{};base64,{}", mime, STANDARD.encode(data)))
    }

    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<(String, Vec<u8>), GatewayError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::Media(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Media(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "application/octet-stream".into());

        let data = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Media(e.to_string()))?;

        debug!(%mime, size = data.len(), "Downloaded media");
        Ok((mime, data.to_vec()))
    }
}

fn transport(e: SignalError) -> GatewayError {
    match e {
        SignalError::NoAvatar(who) => GatewayError::Unavailable(format!("no profile picture for {}", who)),
        other => GatewayError::Transport(other.to_string()),
    }
}

#[async_trait]
impl MessagingGateway for SignalGateway {
    async fn send_message(
        &self,
        destination: &str,
        message: OutboundMessage,
        options: SendOptions,
    ) -> Result<Option<MessageHandle>, GatewayError> {
        let mut request = self.signal.request(destination, message.rendered_text());

        for media in [&message.image, &message.audio].into_iter().flatten() {
            request.base64_attachments.push(self.attachment(media).await?);
        }

        if let Some(quote) = options.quote {
            request.quote_timestamp = Some(quote.id);
            request.quote_author = Some(quote.author);
        }

        let timestamp = self.signal.send_request(request).await.map_err(transport)?;
        Ok(timestamp.map(|id| MessageHandle { id }))
    }

    async fn react_to(
        &self,
        destination: &str,
        message: &MessageRef,
        emoji: &str,
    ) -> Result<(), GatewayError> {
        self.signal
            .react(destination, &message.author, message.id, emoji)
            .await
            .map_err(transport)
    }

    async fn delete_message(
        &self,
        destination: &str,
        handle: MessageHandle,
    ) -> Result<(), GatewayError> {
        self.signal
            .remote_delete(destination, handle.id)
            .await
            .map_err(transport)
    }

    async fn fetch_profile_image(&self, user_id: &str) -> Result<String, GatewayError> {
        self.signal.avatar(user_id).await.map_err(transport)
    }
}
