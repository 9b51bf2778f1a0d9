//! Download command - resolves a media link through ordered providers.

use crate::format::framed;
use async_trait::async_trait;
use command_core::{
    CommandHandler, FallbackError, HandlerResult, InvocationContext, MessagingGateway,
    OutboundMessage, Provider, ProviderFallback, ResourceDescriptor, SendOptions,
};
use reqwest::Url;
use std::sync::Arc;
use tracing::{error, info};

pub struct DownloadHandler {
    providers: Vec<Arc<dyn Provider<ResourceDescriptor>>>,
    fallback: ProviderFallback,
    allowed_prefixes: Vec<String>,
    bot_name: String,
}

impl DownloadHandler {
    pub fn new(
        providers: Vec<Arc<dyn Provider<ResourceDescriptor>>>,
        fallback: ProviderFallback,
        allowed_prefixes: Vec<String>,
        bot_name: String,
    ) -> Self {
        Self {
            providers,
            fallback,
            allowed_prefixes,
            bot_name,
        }
    }

    /// Check the requested URL, returning a user-facing complaint if unusable.
    fn validate(&self, raw: &str) -> Result<(), String> {
        let url = Url::parse(raw).map_err(|_| "that is not a valid URL".to_string())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err("only http(s) links are supported".into());
        }
        if !self.allowed_prefixes.is_empty()
            && !self.allowed_prefixes.iter().any(|p| raw.starts_with(p.as_str()))
        {
            return Err(format!(
                "the URL must start with one of: {}",
                self.allowed_prefixes.join(", ")
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for DownloadHandler {
    async fn handle(
        &self,
        destination: &str,
        gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        let name = ctx.display_name();
        let media_url = ctx.args_text().trim().to_string();

        if media_url.is_empty() {
            ctx.reply(framed(
                &self.bot_name,
                [format!("WAKE UP, {}! Give me a media URL to download! 😤", name)],
            ))
            .await?;
            return Ok(());
        }

        if let Err(problem) = self.validate(&media_url) {
            ctx.reply(framed(&self.bot_name, [format!("Hold on, {}: {} 😣", name, problem)]))
                .await?;
            return Ok(());
        }

        ctx.reply(framed(
            &self.bot_name,
            [format!("Yo {}, snagging your download link, don't blink! 🔍", name)],
        ))
        .await?;

        match self.fallback.resolve(&media_url, &self.providers).await {
            Ok(resolved) => {
                info!(provider = %resolved.provider, "Download link resolved");
                let resource = resolved.value;
                let message = OutboundMessage::text(framed(
                    &self.bot_name,
                    [
                        format!("NAILED IT, {}! Your media is READY! 🔥", name),
                        format!("Title: {}", resource.title.as_deref().unwrap_or("Untitled")),
                        format!("Download: {}", resource.url),
                        format!("Powered by {}", self.bot_name),
                    ],
                ))
                .with_footer(format!("Hey {}! I'm {} 😎", name, self.bot_name));

                gateway
                    .send_message(destination, message, SendOptions::quoting(&ctx.message))
                    .await?;
            }
            Err(FallbackError::NoProviders) => {
                ctx.reply(framed(
                    &self.bot_name,
                    ["No download providers are configured. 😣"],
                ))
                .await?;
            }
            Err(e) => {
                error!(error = %e, "All download providers failed");
                let reason = e.last_reason().unwrap_or("unknown error");
                ctx.reply(framed(
                    &self.bot_name,
                    [format!(
                        "EPIC FLOP, {}! Every provider bombed: {} 😡 Try a better URL!",
                        name, reason
                    )],
                ))
                .await?;
            }
        }
        Ok(())
    }
}
