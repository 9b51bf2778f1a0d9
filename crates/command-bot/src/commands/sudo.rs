//! Sudo command - manages runtime administrators.

use crate::format::mention;
use async_trait::async_trait;
use command_core::{
    Change, CommandHandler, HandlerResult, InvocationContext, MessagingGateway, PermissionGate,
};
use std::sync::Arc;

const USAGE: &str = "Usage: sudo add <id> | sudo del <id> | sudo list\n\
                     Replying to a message with add/del targets its author.";

pub struct SudoHandler {
    gate: Arc<PermissionGate>,
}

impl SudoHandler {
    pub fn new(gate: Arc<PermissionGate>) -> Self {
        Self { gate }
    }

    fn list(&self) -> String {
        let snapshot = self.gate.snapshot();
        let owners: Vec<_> = snapshot.owners().map(mention).collect();
        let sudo: Vec<_> = snapshot.sudo().map(mention).collect();

        format!(
            "*Owners:* {}\n*Sudo:* {}",
            if owners.is_empty() { "none".into() } else { owners.join(", ") },
            if sudo.is_empty() { "none".into() } else { sudo.join(", ") },
        )
    }

    fn respond(&self, ctx: &InvocationContext) -> String {
        let mut args = ctx.raw_args.iter().map(String::as_str);
        let action = args.next().map(str::to_lowercase);
        let target = args
            .next()
            .map(String::from)
            .or_else(|| ctx.quoted.as_ref().map(|q| q.author.clone()));

        match (action.as_deref(), target) {
            (Some("list"), _) => self.list(),
            (Some("add"), Some(target)) => match self.gate.grant(&target) {
                Change::Applied => format!("✅ {} can now run admin commands.", mention(&target)),
                _ => format!("{} is already an admin.", mention(&target)),
            },
            (Some("del" | "remove" | "rm"), Some(target)) => match self.gate.revoke(&target) {
                Change::Applied => format!("✅ {} is no longer an admin.", mention(&target)),
                Change::OwnerLocked => format!("❌ {} is an owner and cannot be removed.", mention(&target)),
                Change::Unchanged => format!("{} is not a sudo admin.", mention(&target)),
            },
            _ => USAGE.into(),
        }
    }
}

#[async_trait]
impl CommandHandler for SudoHandler {
    async fn handle(
        &self,
        _destination: &str,
        _gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        ctx.reply(self.respond(ctx)).await?;
        Ok(())
    }
}
