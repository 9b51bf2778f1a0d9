//! Dare command - random dare.

use async_trait::async_trait;
use command_core::{
    CommandHandler, HandlerResult, InvocationContext, MediaSource, MessagingGateway,
    OutboundMessage, SendOptions,
};
use rand::seq::SliceRandom;

const DARES: &[&str] = &[
    "Send a voice note singing your favorite song.",
    "Change your name to 'Baby Goat' for 1 day.",
    "Call your crush and say 'I love you'.",
    "Act like a robot in a voice note.",
    "Confess something you've never told anyone.",
];

pub struct DareHandler {
    audio_url: Option<String>,
}

impl DareHandler {
    pub fn new(audio_url: Option<String>) -> Self {
        Self { audio_url }
    }

    fn pick() -> &'static str {
        DARES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DARES[0])
    }

    fn render(&self, dare: &str) -> OutboundMessage {
        let message = OutboundMessage::text(format!("🔥 *Dare Challenge:*\n{}", dare));
        match &self.audio_url {
            Some(url) => message.with_audio(MediaSource::Url(url.clone())),
            None => message,
        }
    }
}

#[async_trait]
impl CommandHandler for DareHandler {
    async fn handle(
        &self,
        destination: &str,
        gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        let message = self.render(Self::pick());
        gateway
            .send_message(destination, message, SendOptions::quoting(&ctx.message))
            .await?;
        Ok(())
    }
}
