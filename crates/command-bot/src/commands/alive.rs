//! Alive command - online banner with uptime.

use crate::config::BotConfig;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use command_core::{
    CommandHandler, HandlerResult, InvocationContext, MediaSource, MessagingGateway,
    OutboundMessage, SendOptions,
};
use std::time::{Duration, Instant};

pub struct AliveHandler {
    bot: BotConfig,
    offset: FixedOffset,
    started: Instant,
}

impl AliveHandler {
    pub fn new(bot: BotConfig, offset: FixedOffset, started: Instant) -> Self {
        Self {
            bot,
            offset,
            started,
        }
    }

    fn render(&self, now: DateTime<Utc>, uptime: Duration) -> OutboundMessage {
        let local = now.with_timezone(&self.offset);
        let mut text = format!(
            "✅ *BOT IS ONLINE!*\n🕐 Time: {}\n📅 Date: {}\n⏱️ Uptime: {}\n\n😁 Powered by {}",
            local.format("%H:%M:%S"),
            local.format("%d/%m/%Y"),
            format_uptime(uptime),
            self.bot.name
        );
        if let Some(url) = &self.bot.source_url {
            text.push_str(&format!("\n🔗 {}", url));
        }

        let mut message = match &self.bot.thumbnail_url {
            Some(url) => OutboundMessage::image(MediaSource::Url(url.clone()), text),
            None => OutboundMessage::text(text),
        };
        if let Some(url) = &self.bot.audio_url {
            message = message.with_audio(MediaSource::Url(url.clone()));
        }
        message
    }
}

/// "1d 2h 3m 4s", dropping leading zero units.
fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let (days, hours, minutes, seconds) = (
        secs / 86_400,
        secs % 86_400 / 3_600,
        secs % 3_600 / 60,
        secs % 60,
    );

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", seconds));
    parts.join(" ")
}

#[async_trait]
impl CommandHandler for AliveHandler {
    async fn handle(
        &self,
        destination: &str,
        gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        let message = self.render(Utc::now(), self.started.elapsed());
        gateway
            .send_message(destination, message, SendOptions::quoting(&ctx.message))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(5)), "5s");
        assert_eq!(format_uptime(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3_600)), "1h 0m 0s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn test_render_with_media() {
        let bot = BotConfig {
            name: "TEST BOT".into(),
            thumbnail_url: Some("https://img/thumb.jpg".into()),
            audio_url: Some("https://audio/clip.mp4".into()),
            source_url: Some("https://example.com".into()),
            ..Default::default()
        };
        let handler = AliveHandler::new(bot, FixedOffset::east_opt(0).unwrap(), Instant::now());
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let message = handler.render(now, Duration::from_secs(42));

        assert!(message.text.starts_with("✅ *BOT IS ONLINE!*\n🕐 Time: 03:04:05\n📅 Date: 02/01/2024"));
        assert!(message.text.contains("⏱️ Uptime: 42s"));
        assert!(message.text.contains("Powered by TEST BOT"));
        assert!(message.text.ends_with("🔗 https://example.com"));
        assert_eq!(message.image, Some(MediaSource::Url("https://img/thumb.jpg".into())));
        assert_eq!(message.audio, Some(MediaSource::Url("https://audio/clip.mp4".into())));
    }

    #[test]
    fn test_render_text_only() {
        let handler = AliveHandler::new(
            BotConfig::default(),
            FixedOffset::east_opt(0).unwrap(),
            Instant::now(),
        );
        let message = handler.render(Utc::now(), Duration::from_secs(1));

        assert!(message.image.is_none());
        assert!(message.audio.is_none());
    }
}
