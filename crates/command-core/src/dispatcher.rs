//! Dispatcher: matches inbound text to a command and runs it.

use crate::error::HandlerError;
use crate::gateway::MessagingGateway;
use crate::permissions::PermissionGate;
use crate::registry::CommandRegistry;
use crate::types::{InvocationContext, MessageOrigin, Replier};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Reply sent when an invoker lacks privileges.
pub const DENIAL_REPLY: &str = "This command is restricted to bot administrators.";

/// Reply sent when a handler fails.
pub const FAILURE_REPLY: &str = "Sorry, something went wrong.";

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Text is not addressed to the bot (missing prefix or empty).
    NotACommand,
    /// No command with that name.
    Unknown,
    /// Invoker may not run the command; a denial reply was sent.
    Denied,
    /// Handler finished successfully.
    Completed,
    /// Handler failed or panicked; a failure reply was sent.
    Failed,
}

/// Routes inbound messages to registered command handlers.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    gate: Arc<PermissionGate>,
    gateway: Arc<dyn MessagingGateway>,
    prefix: Option<String>,
    denial_reply: String,
    failure_reply: String,
}

impl Dispatcher {
    /// Create a dispatcher without a command prefix.
    pub fn new(
        registry: Arc<CommandRegistry>,
        gate: Arc<PermissionGate>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        Self {
            registry,
            gate,
            gateway,
            prefix: None,
            denial_reply: DENIAL_REPLY.into(),
            failure_reply: FAILURE_REPLY.into(),
        }
    }

    /// Only treat text starting with `prefix` as a command.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    pub fn with_denial_reply(mut self, text: impl Into<String>) -> Self {
        self.denial_reply = text.into();
        self
    }

    pub fn with_failure_reply(mut self, text: impl Into<String>) -> Self {
        self.failure_reply = text.into();
        self
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Split text into a lowercase command name and its arguments.
    pub fn parse(&self, raw_text: &str) -> Option<(String, Vec<String>)> {
        let text = raw_text.trim_start();
        let text = match &self.prefix {
            Some(prefix) => text.strip_prefix(prefix.as_str())?,
            None => text,
        };

        let mut tokens = text.split_whitespace();
        let name = tokens.next()?.to_lowercase();
        Some((name, tokens.map(str::to_string).collect()))
    }

    /// Dispatch one inbound message. Never fails.
    #[instrument(skip_all, fields(invoker = %origin.invoker_id))]
    pub async fn dispatch(&self, raw_text: &str, origin: MessageOrigin) -> DispatchOutcome {
        let Some((name, raw_args)) = self.parse(raw_text) else {
            return DispatchOutcome::NotACommand;
        };

        let descriptor = match self.registry.lookup(&name) {
            Ok(d) => d,
            Err(_) => {
                debug!(command = %name, "Unknown command");
                return DispatchOutcome::Unknown;
            }
        };

        let destination = origin.destination.clone();
        let replier = Replier::new(
            self.gateway.clone(),
            destination.clone(),
            origin.message.clone(),
        );

        // One snapshot decides both admission and the context flag.
        let privileged = self.gate.snapshot();
        if !privileged.allows(descriptor, &origin.invoker_id) {
            warn!(command = %name, "Permission denied");
            if let Err(e) = replier.reply(self.denial_reply.as_str()).await {
                error!(command = %name, error = %e, "Failed to send denial reply");
            }
            return DispatchOutcome::Denied;
        }

        if let Some(emoji) = &descriptor.reaction {
            if let Err(e) = self
                .gateway
                .react_to(&destination, &origin.message, emoji)
                .await
            {
                warn!(command = %name, error = %e, "Failed to send reaction");
            }
        }

        let is_elevated = privileged.contains(&origin.invoker_id);
        let ctx = InvocationContext::new(name.clone(), raw_args, origin, is_elevated, replier);

        info!(command = %name, args = ctx.raw_args.len(), "Executing command");

        let result = AssertUnwindSafe(descriptor.handler.handle(
            &destination,
            self.gateway.as_ref(),
            &ctx,
        ))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(HandlerError::Other(anyhow::anyhow!(panic_message(&*panic)))));

        match result {
            Ok(()) => {
                debug!(command = %name, "Command completed");
                DispatchOutcome::Completed
            }
            Err(e) => {
                error!(command = %name, invoker = %ctx.invoker_id, error = %e, "Command failed");
                if let Err(e) = ctx.reply(self.failure_reply.as_str()).await {
                    error!(command = %name, error = %e, "Failed to send failure reply");
                }
                DispatchOutcome::Failed
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {}", s)
    } else {
        "handler panicked".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GatewayError, HandlerResult};
    use crate::gateway::{MessageHandle, MessageRef, OutboundMessage, SendOptions};
    use crate::types::{CommandDescriptor, CommandHandler};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const INVOKER: &str = "+15550000001";

    /// Records sent texts; optionally revokes an identity when reacting.
    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<String>>,
        revoke_on_react: Option<(Arc<PermissionGate>, String)>,
    }

    impl RecordingGateway {
        fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagingGateway for RecordingGateway {
        async fn send_message(
            &self,
            _destination: &str,
            message: OutboundMessage,
            _options: SendOptions,
        ) -> Result<Option<MessageHandle>, GatewayError> {
            self.sent.lock().unwrap().push(message.text);
            Ok(None)
        }

        async fn react_to(
            &self,
            _destination: &str,
            _message: &MessageRef,
            _emoji: &str,
        ) -> Result<(), GatewayError> {
            if let Some((gate, identity)) = &self.revoke_on_react {
                gate.revoke(identity);
            }
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

    struct PanicHandler;

    #[async_trait]
    impl CommandHandler for PanicHandler {
        async fn handle(
            &self,
            _destination: &str,
            _gateway: &dyn MessagingGateway,
            _ctx: &InvocationContext,
        ) -> HandlerResult {
            panic!("boom");
        }
    }

    struct PongHandler;

    #[async_trait]
    impl CommandHandler for PongHandler {
        async fn handle(
            &self,
            _destination: &str,
            _gateway: &dyn MessagingGateway,
            ctx: &InvocationContext,
        ) -> HandlerResult {
            ctx.reply("pong").await?;
            Ok(())
        }
    }

    /// Remembers the elevation flag it was handed.
    #[derive(Default)]
    struct ElevationHandler {
        seen: Mutex<Option<bool>>,
    }

    #[async_trait]
    impl CommandHandler for ElevationHandler {
        async fn handle(
            &self,
            _destination: &str,
            _gateway: &dyn MessagingGateway,
            ctx: &InvocationContext,
        ) -> HandlerResult {
            *self.seen.lock().unwrap() = Some(ctx.is_elevated);
            Ok(())
        }
    }

    fn dispatcher_with(prefix: &str, gateway: Arc<RecordingGateway>) -> Dispatcher {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDescriptor::new("boom", "Test", Arc::new(PanicHandler)))
            .unwrap();
        registry
            .register(CommandDescriptor::new("ping", "Test", Arc::new(PongHandler)))
            .unwrap();
        Dispatcher::new(
            Arc::new(registry),
            Arc::new(PermissionGate::default()),
            gateway,
        )
        .with_prefix(prefix)
    }

    fn dispatcher(prefix: &str) -> Dispatcher {
        dispatcher_with(prefix, Arc::new(RecordingGateway::default()))
    }

    fn origin() -> MessageOrigin {
        MessageOrigin {
            invoker_id: INVOKER.into(),
            invoker_name: None,
            destination: INVOKER.into(),
            message: MessageRef {
                author: INVOKER.into(),
                id: 1,
            },
            quoted: None,
        }
    }

    #[test]
    fn test_parse_without_prefix() {
        let d = dispatcher("");
        assert_eq!(
            d.parse("  PING  a  b"),
            Some(("ping".into(), vec!["a".into(), "b".into()]))
        );
        assert_eq!(d.parse("   "), None);
    }

    #[test]
    fn test_parse_with_prefix() {
        let d = dispatcher("!");
        assert_eq!(d.parse("!time"), Some(("time".into(), vec![])));
        assert_eq!(d.parse("time"), None);
        assert_eq!(d.parse("!"), None);
        assert_eq!(d.prefix(), Some("!"));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let gateway = Arc::new(RecordingGateway::default());
        let d = dispatcher_with("", gateway.clone());

        assert_eq!(d.dispatch("boom", origin()).await, DispatchOutcome::Failed);
        assert_eq!(gateway.texts(), vec![FAILURE_REPLY.to_string()]);

        assert_eq!(d.dispatch("ping", origin()).await, DispatchOutcome::Completed);
        assert_eq!(gateway.texts(), vec![FAILURE_REPLY.to_string(), "pong".to_string()]);
    }

    #[tokio::test]
    async fn test_elevation_flag_matches_admission_decision() {
        let gate = Arc::new(PermissionGate::new(["+15550009999"]));
        gate.grant(INVOKER);

        // Privileges are revoked while the reaction is in flight.
        let gateway = Arc::new(RecordingGateway {
            revoke_on_react: Some((gate.clone(), INVOKER.to_string())),
            ..Default::default()
        });
        let handler = Arc::new(ElevationHandler::default());

        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandDescriptor::new("purge", "Admin", handler.clone())
                    .elevated()
                    .with_reaction("🧹"),
            )
            .unwrap();
        let d = Dispatcher::new(Arc::new(registry), gate.clone(), gateway.clone());

        assert_eq!(d.dispatch("purge", origin()).await, DispatchOutcome::Completed);
        assert_eq!(*handler.seen.lock().unwrap(), Some(true));
        assert!(!gate.snapshot().contains(INVOKER));
        assert!(gateway.texts().is_empty());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("bad state");
        assert_eq!(panic_message(payload.as_ref()), "handler panicked: bad state");
    }
}
