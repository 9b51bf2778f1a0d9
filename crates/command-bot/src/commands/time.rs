//! Time command - current time in the configured offset.

use crate::format::ordinal;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use command_core::{
    CommandHandler, HandlerResult, InvocationContext, MediaSource, MessagingGateway,
    OutboundMessage, SendOptions,
};

pub struct TimeHandler {
    offset: FixedOffset,
    audio_url: Option<String>,
}

impl TimeHandler {
    pub fn new(offset: FixedOffset, audio_url: Option<String>) -> Self {
        Self { offset, audio_url }
    }

    fn render(&self, now: DateTime<Utc>) -> OutboundMessage {
        let local = now.with_timezone(&self.offset);
        let message = OutboundMessage::text(format!(
            "⏰ Current Time: {}\n📅 Date: {}, {} {} {}\n🕰️ (UTC{})",
            local.format("%H:%M:%S"),
            local.format("%A"),
            local.format("%B"),
            ordinal(local.day()),
            local.year(),
            self.offset
        ));
        match &self.audio_url {
            Some(url) => message.with_audio(MediaSource::Url(url.clone())),
            None => message,
        }
    }
}

#[async_trait]
impl CommandHandler for TimeHandler {
    async fn handle(
        &self,
        destination: &str,
        gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        gateway
            .send_message(
                destination,
                self.render(Utc::now()),
                SendOptions::quoting(&ctx.message),
            )
            .await?;
        Ok(())
    }
}
