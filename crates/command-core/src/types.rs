//! Command descriptors, handler contract and invocation context.

use crate::error::{GatewayError, HandlerResult};
use crate::gateway::{MessageHandle, MessageRef, MessagingGateway, OutboundMessage, SendOptions};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Trait implemented by every command body.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command.
    ///
    /// `destination` is the conversation the command was sent in.
    async fn handle(
        &self,
        destination: &str,
        gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult;
}

/// Metadata and handler for one registered command name.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    pub category: String,
    pub requires_elevated: bool,
    pub reaction: Option<String>,
    pub description: Option<String>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    /// Create a descriptor. The name is stored lowercase.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            name: name.into().trim().to_lowercase(),
            category: category.into(),
            requires_elevated: false,
            reaction: None,
            description: None,
            handler,
        }
    }

    /// Restrict the command to privileged invokers.
    pub fn elevated(mut self) -> Self {
        self.requires_elevated = true;
        self
    }

    pub fn with_reaction(mut self, emoji: impl Into<String>) -> Self {
        self.reaction = Some(emoji.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("requires_elevated", &self.requires_elevated)
            .field("reaction", &self.reaction)
            .finish_non_exhaustive()
    }
}

/// Message the invocation replied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedMessage {
    pub author: String,
    pub id: i64,
    pub text: Option<String>,
}

/// Where an inbound message came from, as assembled from the platform event.
#[derive(Debug, Clone)]
pub struct MessageOrigin {
    pub invoker_id: String,
    pub invoker_name: Option<String>,
    /// Conversation replies go to (group or direct).
    pub destination: String,
    pub message: MessageRef,
    pub quoted: Option<QuotedMessage>,
}

/// Turns a platform event into a [`MessageOrigin`].
pub trait ContextAssembler<E>: Send + Sync {
    fn assemble(&self, event: &E) -> MessageOrigin;
}

/// Sends text replies into the conversation an invocation came from.
#[derive(Clone)]
pub struct Replier {
    gateway: Arc<dyn MessagingGateway>,
    destination: String,
    quote: MessageRef,
}

impl Replier {
    pub fn new(gateway: Arc<dyn MessagingGateway>, destination: String, quote: MessageRef) -> Self {
        Self {
            gateway,
            destination,
            quote,
        }
    }

    /// Reply with plain text, quoting the triggering message.
    pub async fn reply(&self, text: impl Into<String> + Send) -> Result<Option<MessageHandle>, GatewayError> {
        self.send(OutboundMessage::text(text)).await
    }

    /// Reply with a full payload, quoting the triggering message.
    pub async fn send(&self, message: OutboundMessage) -> Result<Option<MessageHandle>, GatewayError> {
        self.gateway
            .send_message(&self.destination, message, SendOptions::quoting(&self.quote))
            .await
    }
}

/// Per-message context handed to a command handler.
pub struct InvocationContext {
    /// Matched command name (lowercase).
    pub command: String,
    pub raw_args: Vec<String>,
    pub invoker_id: String,
    pub invoker_name: Option<String>,
    pub is_elevated: bool,
    pub quoted: Option<QuotedMessage>,
    pub message: MessageRef,
    replier: Replier,
}

impl InvocationContext {
    pub fn new(
        command: String,
        raw_args: Vec<String>,
        origin: MessageOrigin,
        is_elevated: bool,
        replier: Replier,
    ) -> Self {
        Self {
            command,
            raw_args,
            invoker_id: origin.invoker_id,
            invoker_name: origin.invoker_name,
            is_elevated,
            quoted: origin.quoted,
            message: origin.message,
            replier,
        }
    }

    /// Display name of the invoker, falling back to the identity.
    pub fn display_name(&self) -> &str {
        self.invoker_name.as_deref().unwrap_or(&self.invoker_id)
    }

    /// Arguments joined back into one string.
    pub fn args_text(&self) -> String {
        self.raw_args.join(" ")
    }

    /// Send a text reply into the originating conversation.
    pub async fn reply(&self, text: impl Into<String> + Send) -> Result<Option<MessageHandle>, GatewayError> {
        self.replier.reply(text).await
    }
}
