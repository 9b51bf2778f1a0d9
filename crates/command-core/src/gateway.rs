//! Messaging gateway contract and outbound payload types.

use crate::error::GatewayError;
use async_trait::async_trait;

/// Reference to a message on the platform (author plus platform id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    /// Identity that authored the message.
    pub author: String,
    /// Platform message id (Signal uses the sent timestamp).
    pub id: i64,
}

/// Handle to a message the bot sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub id: i64,
}

/// Media attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Remote media the gateway fetches before sending.
    Url(String),
    /// Media already in memory.
    Bytes { mime: String, data: Vec<u8> },
}

/// Rendered outbound payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub footer: Option<String>,
    pub image: Option<MediaSource>,
    pub audio: Option<MediaSource>,
    pub mentions: Vec<String>,
}

impl OutboundMessage {
    /// Plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Image message with a caption.
    pub fn image(media: MediaSource, caption: impl Into<String>) -> Self {
        Self {
            text: caption.into(),
            image: Some(media),
            ..Default::default()
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn with_audio(mut self, media: MediaSource) -> Self {
        self.audio = Some(media);
        self
    }

    pub fn with_mention(mut self, identity: impl Into<String>) -> Self {
        self.mentions.push(identity.into());
        self
    }

    /// Text as it is shown to the recipient, footer included.
    pub fn rendered_text(&self) -> String {
        match &self.footer {
            Some(footer) if !footer.is_empty() => format!("{}\n\n{}", self.text, footer),
            _ => self.text.clone(),
        }
    }
}

/// Delivery options for an outbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Message to quote in the reply.
    pub quote: Option<MessageRef>,
}

impl SendOptions {
    pub fn quoting(message: &MessageRef) -> Self {
        Self {
            quote: Some(message.clone()),
        }
    }
}

/// Platform primitives the command layer relies on.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a message into a conversation.
    async fn send_message(
        &self,
        destination: &str,
        message: OutboundMessage,
        options: SendOptions,
    ) -> Result<Option<MessageHandle>, GatewayError>;

    /// React to a message with an emoji.
    async fn react_to(
        &self,
        destination: &str,
        message: &MessageRef,
        emoji: &str,
    ) -> Result<(), GatewayError>;

    /// Delete a message the bot sent earlier.
    async fn delete_message(
        &self,
        destination: &str,
        handle: MessageHandle,
    ) -> Result<(), GatewayError>;

    /// Resolve the profile picture URL of a user.
    async fn fetch_profile_image(&self, user_id: &str) -> Result<String, GatewayError>;
}
