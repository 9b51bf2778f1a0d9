//! Application configuration loaded from environment variables and an
//! optional `bot.toml`.

use anyhow::{bail, Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Signal configuration
    pub signal: SignalConfig,

    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,

    /// GitHub repository lookup
    #[serde(default)]
    pub github: GithubConfig,

    /// Media download providers
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    /// Signal CLI REST API endpoint
    #[serde(default = "default_signal_service")]
    pub service_url: String,

    /// Number of the linked bot account
    pub phone_number: String,

    /// Poll interval for messages
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Wait after a failed poll
    #[serde(default = "default_error_backoff", with = "humantime_serde")]
    pub error_backoff: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Name shown in banners and footers
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Command prefix (empty for none)
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Comma-separated identities allowed to run elevated commands
    #[serde(default)]
    pub owners: String,

    /// Fixed offset used by time displays, e.g. "+03:00"
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// Picture sent when a profile picture is unavailable
    #[serde(default)]
    pub picture_url: Option<String>,

    /// Voice clip attached to alive, time and dare replies
    #[serde(default)]
    pub audio_url: Option<String>,

    /// Image attached to the alive banner
    #[serde(default)]
    pub thumbnail_url: Option<String>,

    /// Link appended to banners
    #[serde(default)]
    pub source_url: Option<String>,

    /// Reply sent when an invoker lacks privileges
    #[serde(default)]
    pub denial_reply: Option<String>,

    /// Reply sent when a command fails
    #[serde(default)]
    pub failure_reply: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format ("pretty" or "json")
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    /// GitHub REST API base URL
    #[serde(default = "default_github_api")]
    pub api_url: String,

    /// Repository owner
    #[serde(default = "default_github_owner")]
    pub owner: String,

    /// Repository name
    #[serde(default = "default_github_repo")]
    pub repo: String,

    /// Optional token for higher rate limits
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Upper bound for each provider call
    #[serde(default = "default_provider_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Comma-separated URL prefixes accepted by the download command (empty for any)
    #[serde(default)]
    pub allowed_prefixes: String,

    /// Providers, tried in order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// One HTTP JSON download provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    /// Request URL; `{url}` is replaced by the encoded media URL
    pub url_template: String,
    /// JSON pointer to a boolean that must be `true`
    #[serde(default)]
    pub success_pointer: Option<String>,
    /// JSON pointer to the download URL
    pub url_pointer: String,
    /// JSON pointer to the media title
    #[serde(default)]
    pub title_pointer: Option<String>,
}

// Default implementations
impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            prefix: default_prefix(),
            owners: String::new(),
            utc_offset: default_utc_offset(),
            picture_url: None,
            audio_url: None,
            thumbnail_url: None,
            source_url: None,
            denial_reply: None,
            failure_reply: None,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api(),
            owner: default_github_owner(),
            repo: default_github_repo(),
            token: None,
            timeout: default_timeout(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout: default_provider_timeout(),
            allowed_prefixes: String::new(),
            providers: Vec::new(),
        }
    }
}

// Default value functions
fn default_signal_service() -> String {
    "http://signal-api:8080".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(200)
}

fn default_error_backoff() -> Duration {
    Duration::from_secs(5)
}

fn default_bot_name() -> String {
    "XMD BOT".into()
}

fn default_prefix() -> String {
    "!".into()
}

fn default_utc_offset() -> String {
    "+00:00".into()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

fn default_github_api() -> String {
    "https://api.github.com".into()
}

fn default_github_owner() -> String {
    "romanuzkenya".into()
}

fn default_github_repo() -> String {
    "kijana-mdogo".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_provider_timeout() -> Duration {
    Duration::from_secs(15)
}

/// Split a comma-separated setting into trimmed, non-empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse an offset such as "+03:00", "-0530" or "Z".
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).context("invalid offset");
    }

    let (sign, rest) = match value.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => bail!("offset must start with + or -: {value}"),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        bail!("malformed offset: {value}");
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>()?, 0),
        4 => (digits[..2].parse::<i32>()?, digits[2..].parse::<i32>()?),
        _ => bail!("malformed offset: {value}"),
    };

    if hours > 14 || minutes > 59 {
        bail!("offset out of range: {value}");
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .with_context(|| format!("offset out of range: {value}"))
}

impl BotConfig {
    /// Configured owner identities.
    pub fn owner_ids(&self) -> Vec<String> {
        split_list(&self.owners)
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        parse_utc_offset(&self.utc_offset)
    }
}

impl DownloadConfig {
    pub fn allowed_prefixes(&self) -> Vec<String> {
        split_list(&self.allowed_prefixes)
    }
}

impl Config {
    /// Load configuration from `bot.toml` (optional) and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("bot").required(false))
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Note: try_parsing(true) would parse +16504928286 as a positive number
                    // stripping the + prefix. Keep strings as strings.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.bot.offset().context("Invalid BOT__UTC_OFFSET")?;
        Ok(config)
    }
}
