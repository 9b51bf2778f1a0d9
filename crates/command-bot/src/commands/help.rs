//! Help command - displays available commands.

use async_trait::async_trait;
use command_core::{
    CommandHandler, CommandRegistry, HandlerResult, InvocationContext, MessagingGateway,
};
use std::sync::{Arc, OnceLock, Weak};

pub struct HelpHandler {
    catalog: Arc<OnceLock<Weak<CommandRegistry>>>,
    prefix: String,
    bot_name: String,
}

impl HelpHandler {
    /// `catalog` is filled once the registry holding this handler is frozen.
    pub fn new(
        catalog: Arc<OnceLock<Weak<CommandRegistry>>>,
        prefix: String,
        bot_name: String,
    ) -> Self {
        Self {
            catalog,
            prefix,
            bot_name,
        }
    }

    /// Listing grouped by category.
    pub fn render(&self, registry: &CommandRegistry, show_elevated: bool) -> String {
        let mut out = format!("*{}* commands\n", self.bot_name);

        for category in registry.categories() {
            let mut entries = registry
                .list_by_category(category)
                .filter(|d| show_elevated || !d.requires_elevated)
                .peekable();
            if entries.peek().is_none() {
                continue;
            }

            out.push_str(&format!("\n*{}*\n", category));
            for d in entries {
                out.push_str(&format!("- {}{}", self.prefix, d.name()));
                if let Some(description) = &d.description {
                    out.push_str(&format!(" - {}", description));
                }
                if d.requires_elevated {
                    out.push_str(" (admin)");
                }
                out.push('\n');
            }
        }

        out.trim_end().to_string()
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(
        &self,
        _destination: &str,
        _gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        let registry = self
            .catalog
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| anyhow::anyhow!("command catalog not initialized"))?;

        ctx.reply(self.render(&registry, ctx.is_elevated)).await?;
        Ok(())
    }
}
