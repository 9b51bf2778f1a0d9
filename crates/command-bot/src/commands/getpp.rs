//! Getpp command - profile picture of a quoted message's author.

use crate::format::{framed, mention};
use async_trait::async_trait;
use command_core::{
    CommandHandler, HandlerResult, InvocationContext, MediaSource, MessagingGateway,
    OutboundMessage, SendOptions,
};
use tracing::{info, warn};

pub struct GetPpHandler {
    bot_name: String,
    fallback_picture: Option<String>,
}

impl GetPpHandler {
    pub fn new(bot_name: String, fallback_picture: Option<String>) -> Self {
        Self {
            bot_name,
            fallback_picture,
        }
    }
}

#[async_trait]
impl CommandHandler for GetPpHandler {
    async fn handle(
        &self,
        destination: &str,
        gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        let name = ctx.display_name();

        let Some(quoted) = &ctx.quoted else {
            ctx.reply(framed(
                &self.bot_name,
                [format!(
                    "Yo {}, reply to someone's message to snag their profile pic! 🤔",
                    name
                )],
            ))
            .await?;
            return Ok(());
        };
        let target = mention(&quoted.author);

        ctx.reply(framed(
            &self.bot_name,
            [format!("Yo {}, hunting for {}'s profile pic! 📸 Hold tight! 🔍", name, target)],
        ))
        .await?;

        let picture = match gateway.fetch_profile_image(&quoted.author).await {
            Ok(url) => url,
            Err(e) => {
                warn!(target = %quoted.author, error = %e, "Profile picture unavailable");
                let Some(fallback) = &self.fallback_picture else {
                    ctx.reply(framed(
                        &self.bot_name,
                        [format!("Sorry {}, {}'s profile pic is locked tight! 😣", name, target)],
                    ))
                    .await?;
                    return Ok(());
                };
                ctx.reply(framed(
                    &self.bot_name,
                    [format!(
                        "Yo {}, {}'s profile pic is locked tight! 😣 Here's mine instead! 😎",
                        name, target
                    )],
                ))
                .await?;
                fallback.clone()
            }
        };

        info!(target = %quoted.author, "Sending profile picture");
        let message = OutboundMessage::image(
            MediaSource::Url(picture),
            framed(
                &self.bot_name,
                [
                    format!("BOOM, {}! Snagged {}'s profile pic! 🔥", name, target),
                    format!("Powered by {}", self.bot_name),
                ],
            ),
        )
        .with_footer(format!("Hey {}! I'm {} 😎", name, self.bot_name))
        .with_mention(quoted.author.clone());

        gateway
            .send_message(destination, message, SendOptions::quoting(&ctx.message))
            .await?;
        Ok(())
    }
}
