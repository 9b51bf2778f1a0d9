//! Repo command - GitHub repository information.

use crate::format::format_number;
use crate::github::{GitHubClient, RepoDetails};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use command_core::{
    CommandHandler, HandlerResult, InvocationContext, MessagingGateway, OutboundMessage,
    SendOptions,
};
use tracing::{error, warn};

const TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

pub struct RepoHandler {
    github: GitHubClient,
    offset: FixedOffset,
    channel_url: Option<String>,
}

impl RepoHandler {
    pub fn new(github: GitHubClient, offset: FixedOffset, channel_url: Option<String>) -> Self {
        Self {
            github,
            offset,
            channel_url,
        }
    }

    fn render(&self, details: &RepoDetails, now: DateTime<Utc>) -> String {
        let mut out = format!(
            "🌟 *{name}* - GitHub Repository Information 🌟\n\n\
             📝 *Description:* {description}\n\
             👨‍💻 *Owner:* {owner}\n\
             🌿 *Default Branch:* {branch}\n\
             📜 *License:* {license}\n\n\
             📊 *Statistics:*\n\
             ⭐ *Stars:* {stars}\n\
             🍴 *Forks:* {forks}\n\
             👀 *Watchers:* {watchers}\n\
             ❗ *Open Issues:* {issues}\n\
             🗃️ *Repository Size:* {size} KB\n\n\
             ⏳ *Created:* {created}\n\
             🔄 *Last Updated:* {updated}\n\n",
            name = details.name,
            description = details
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("No description provided"),
            owner = details.owner.login,
            branch = details.default_branch,
            license = details
                .license
                .as_ref()
                .map(|l| l.name.as_str())
                .unwrap_or("No license"),
            stars = format_number(details.stargazers_count),
            forks = format_number(details.forks_count),
            watchers = format_number(details.watchers_count),
            issues = format_number(details.open_issues_count),
            size = format_number(details.size),
            created = details.created_at.format(TIME_FORMAT),
            updated = details.updated_at.format(TIME_FORMAT),
        );

        if let Some(channel) = &self.channel_url {
            out.push_str(&format!("📢 *Official Channel:* {}\n", channel));
        }
        out.push_str(&format!(
            "📅 *Info Fetched:* {}\n\n🔗 *Repository URL:*\n{}",
            now.with_timezone(&self.offset).format(TIME_FORMAT),
            details.html_url
        ));
        out
    }
}

#[async_trait]
impl CommandHandler for RepoHandler {
    async fn handle(
        &self,
        destination: &str,
        gateway: &dyn MessagingGateway,
        ctx: &InvocationContext,
    ) -> HandlerResult {
        let loading = ctx
            .reply("⏳ Fetching repository information from GitHub...")
            .await?;

        let details = match self.github.fetch_repo().await {
            Ok(details) => details,
            Err(e) => {
                error!(repo = %self.github.slug(), error = %e, "GitHub lookup failed");
                ctx.reply(
                    "❌ Error: Failed to fetch repository data from GitHub\n\nPlease try again later.",
                )
                .await?;
                return Ok(());
            }
        };

        let options = SendOptions::quoting(&ctx.message);
        gateway
            .send_message(
                destination,
                OutboundMessage::text(format!(
                    "🛠️ *{}* - Developed by *{}*",
                    details.name, details.owner.login
                )),
                options.clone(),
            )
            .await?;
        gateway
            .send_message(
                destination,
                OutboundMessage::text(self.render(&details, Utc::now())),
                options,
            )
            .await?;

        if let Some(handle) = loading {
            if let Err(e) = gateway.delete_message(destination, handle).await {
                warn!(error = %e, "Couldn't delete loading message");
            }
        }
        Ok(())
    }
}
