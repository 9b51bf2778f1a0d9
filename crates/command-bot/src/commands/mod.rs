//! Bot command handlers.

mod alive;
mod dare;
mod download;
mod getpp;
mod help;
mod ping;
mod repo;
mod sudo;
mod time;

pub use alive::AliveHandler;
pub use dare::DareHandler;
pub use download::DownloadHandler;
pub use getpp::GetPpHandler;
pub use help::HelpHandler;
pub use ping::PingHandler;
pub use repo::RepoHandler;
pub use sudo::SudoHandler;
pub use time::TimeHandler;

use crate::config::{BotConfig, Config};
use crate::error::AppResult;
use crate::github::GitHubClient;
use crate::providers;
use anyhow::Context;
use command_core::{
    CommandDescriptor, CommandRegistry, Dispatcher, MessagingGateway, PermissionGate,
    ProviderFallback,
};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Instant;
use tracing::info;

/// Shared collaborators handed to command handlers at startup.
pub struct CommandDeps {
    pub config: Config,
    pub gate: Arc<PermissionGate>,
    pub http: reqwest::Client,
    pub started: Instant,
}

/// Register every command and freeze the registry.
///
/// Fails on the first duplicate name.
pub fn build_registry(deps: &CommandDeps) -> AppResult<Arc<CommandRegistry>> {
    let bot = &deps.config.bot;
    let offset = bot.offset()?;
    let catalog = Arc::new(OnceLock::<Weak<CommandRegistry>>::new());

    let github = GitHubClient::new(
        &deps.config.github.api_url,
        &deps.config.github.owner,
        &deps.config.github.repo,
        deps.config.github.token.clone(),
        deps.config.github.timeout,
    )
    .context("Failed to create GitHub client")?;

    let repo = Arc::new(RepoHandler::new(github, offset, bot.source_url.clone()));
    let alive = Arc::new(AliveHandler::new(bot.clone(), offset, deps.started));
    let download = Arc::new(DownloadHandler::new(
        providers::from_config(&deps.http, &deps.config.download.providers),
        ProviderFallback::new(deps.config.download.timeout),
        deps.config.download.allowed_prefixes(),
        bot.name.clone(),
    ));
    let help = Arc::new(HelpHandler::new(catalog.clone(), bot.prefix.clone(), bot.name.clone()));

    let mut registry = CommandRegistry::new();

    registry.register(
        CommandDescriptor::new("ping", "General", Arc::new(PingHandler))
            .with_description("Check that the bot responds"),
    )?;
    registry.register_all(["alive", "xmd"].map(|name| {
        CommandDescriptor::new(name, "Tools", alive.clone())
            .with_reaction("😁")
            .with_description("Show bot status and uptime")
    }))?;
    registry.register(
        CommandDescriptor::new(
            "time",
            "Utility",
            Arc::new(TimeHandler::new(offset, bot.audio_url.clone())),
        )
        .with_reaction("⏰")
        .with_description("Show the current time"),
    )?;
    registry.register(
        CommandDescriptor::new("dare", "Fun", Arc::new(DareHandler::new(bot.audio_url.clone())))
            .with_reaction("🔥")
            .with_description("Get a random dare"),
    )?;
    registry.register(
        CommandDescriptor::new(
            "getpp",
            "General",
            Arc::new(GetPpHandler::new(bot.name.clone(), bot.picture_url.clone())),
        )
        .with_reaction("📷")
        .with_description("Reply to a message to get its author's profile picture"),
    )?;

    registry.register_all(["repo", "github", "script", "sc"].map(|name| {
        CommandDescriptor::new(name, "GitHub", repo.clone())
            .with_reaction("💻")
            .with_description("Show repository information")
    }))?;

    registry.register_all(["download", "dl"].map(|name| {
        CommandDescriptor::new(name, "Downloader", download.clone())
            .elevated()
            .with_reaction("⬇️")
            .with_description("Resolve a media download link")
    }))?;

    registry.register_all(["help", "menu"].map(|name| {
        CommandDescriptor::new(name, "General", help.clone())
            .with_description("List available commands")
    }))?;

    registry.register(
        CommandDescriptor::new("sudo", "Admin", Arc::new(SudoHandler::new(deps.gate.clone())))
            .elevated()
            .with_description("Manage bot administrators: add|del|list"),
    )?;

    let registry = Arc::new(registry);
    let _ = catalog.set(Arc::downgrade(&registry));

    info!(
        commands = registry.len(),
        categories = registry.categories().len(),
        "Command registry built"
    );
    Ok(registry)
}

/// Dispatcher using the configured prefix and reply texts.
pub fn build_dispatcher(
    bot: &BotConfig,
    registry: Arc<CommandRegistry>,
    gate: Arc<PermissionGate>,
    gateway: Arc<dyn MessagingGateway>,
) -> Dispatcher {
    let mut dispatcher = Dispatcher::new(registry, gate, gateway).with_prefix(bot.prefix.clone());
    if let Some(text) = &bot.denial_reply {
        dispatcher = dispatcher.with_denial_reply(text.clone());
    }
    if let Some(text) = &bot.failure_reply {
        dispatcher = dispatcher.with_failure_reply(text.clone());
    }
    dispatcher
}
