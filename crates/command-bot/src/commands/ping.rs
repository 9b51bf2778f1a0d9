//! Ping command - liveness check.

use async_trait::async_trait;
use command_core::{CommandHandler, HandlerResult, InvocationContext, MessagingGateway};

pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
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
