//! Common test utilities for dispatch tests.

#![allow(dead_code)]

use async_trait::async_trait;
use command_core::{
    CommandHandler, GatewayError, HandlerResult, InvocationContext, MessageHandle, MessageOrigin,
    MessageRef, MessagingGateway, OutboundMessage, SendOptions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A message captured by [`RecordingGateway`].
#[derive(Debug, Clone)]
pub struct Sent {
    pub destination: String,
    pub message: OutboundMessage,
    pub options: SendOptions,
}

/// Gateway double that records every call.
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<Sent>>,
    pub reactions: Mutex<Vec<String>>,
    pub fail_reactions: bool,
}

impl RecordingGateway {
    pub fn failing_reactions() -> Self {
        Self {
            fail_reactions: true,
            ..Default::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.message.text.clone())
            .collect()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<String> {
        self.reactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_message(
        &self,
        destination: &str,
        message: OutboundMessage,
        options: SendOptions,
    ) -> Result<Option<MessageHandle>, GatewayError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent {
            destination: destination.into(),
            message,
            options,
        });
        Ok(Some(MessageHandle {
            id: sent.len() as i64,
        }))
    }

    async fn react_to(
        &self,
        _destination: &str,
        _message: &MessageRef,
        emoji: &str,
    ) -> Result<(), GatewayError> {
        if self.fail_reactions {
            return Err(GatewayError::Transport("reactions unavailable".into()));
        }
        self.reactions.lock().unwrap().push(emoji.into());
        Ok(())
    }

    async fn delete_message(
        &self,
        _destination: &str,
        _handle: MessageHandle,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn fetch_profile_image(&self, user_id: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Unavailable(user_id.into()))
    }
}

/// Handler that replies with fixed text and counts its calls.
pub struct ReplyHandler {
    pub text: &'static str,
    pub calls: AtomicUsize,
}

impl ReplyHandler {
    pub fn new(text: &'static str) -> Self {
        Self {
            text,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandHandler for ReplyHandler {
    async fn handle(
        &self,
        _destination: &str,
        _gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ctx.reply(self.text).await?;
        Ok(())
    }
}

/// Handler that always fails.
pub struct FailingHandler;

#[async_trait]
impl CommandHandler for FailingHandler {
    async fn handle(
        &self,
        _destination: &str,
        _gateway: &dyn MessagingGateway,
        _ctx: &InvocationContext,
    ) -> HandlerResult {
        Err(anyhow::anyhow!("upstream exploded").into())
    }
}

/// Handler that records the arguments it saw.
#[derive(Default)]
pub struct ArgsHandler {
    pub seen: Mutex<Vec<(String, Vec<String>, bool)>>,
}

#[async_trait]
impl CommandHandler for ArgsHandler {
    async fn handle(
        &self,
        _destination: &str,
        _gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        self.seen
            .lock()
            .unwrap()
            .push((ctx.command.clone(), ctx.raw_args.clone(), ctx.is_elevated));
        Ok(())
    }
}

/// Origin for a direct message from `invoker`.
pub fn origin(invoker: &str) -> MessageOrigin {
    MessageOrigin {
        invoker_id: invoker.into(),
        invoker_name: Some("Tester".into()),
        destination: invoker.into(),
        message: MessageRef {
            author: invoker.into(),
            id: 1_700_000_000_000,
        },
        quoted: None,
    }
}
