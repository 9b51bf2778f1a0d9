//! Common test utilities for integration tests.

#![allow(dead_code)]

use command_bot::commands::{build_dispatcher, build_registry, CommandDeps};
use command_bot::config::{BotConfig, Config, DownloadConfig, GithubConfig, ProviderConfig, SignalConfig};
use command_bot::gateway::SignalGateway;
use command_core::{Dispatcher, MessageOrigin, MessageRef, PermissionGate, QuotedMessage};
use signal_client::SignalClient;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_test::assert_ok;
use wiremock::MockServer;

pub const BOT_NUMBER: &str = "+15555555555";
pub const OWNER: &str = "+14155550001";
pub const USER: &str = "+14155551234";

/// Configuration pointing every external service at mock servers.
pub fn test_config(signal: &MockServer, api: &MockServer, providers: Vec<ProviderConfig>) -> Config {
    Config {
        signal: SignalConfig {
            service_url: signal.uri(),
            phone_number: BOT_NUMBER.into(),
            poll_interval: Duration::from_millis(50),
            error_backoff: Duration::from_millis(50),
        },
        bot: BotConfig {
            name: "TEST BOT".into(),
            owners: OWNER.into(),
            picture_url: Some(format!("{}/bot.png", api.uri())),
            ..Default::default()
        },
        github: GithubConfig {
            api_url: api.uri(),
            owner: "octo".into(),
            repo: "bot".into(),
            token: None,
            timeout: Duration::from_secs(5),
        },
        download: DownloadConfig {
            timeout: Duration::from_secs(2),
            allowed_prefixes: String::new(),
            providers,
        },
    }
}

/// Provider definition served by the mock API server.
pub fn provider(api: &MockServer, name: &str, url_pointer: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.into(),
        url_template: format!("{}/api/{}?url={{url}}", api.uri(), name),
        success_pointer: Some("/success".into()),
        url_pointer: url_pointer.into(),
        title_pointer: Some("/result/title".into()),
    }
}

/// Full dispatcher wired to the Signal mock through the real gateway.
pub fn test_dispatcher(config: Config) -> Dispatcher {
    let http = reqwest::Client::new();
    let gate = Arc::new(PermissionGate::new(config.bot.owner_ids()));
    let signal = assert_ok!(SignalClient::new(
        &config.signal.service_url,
        &config.signal.phone_number
    ));
    let bot = config.bot.clone();

    let registry = build_registry(&CommandDeps {
        config,
        gate: gate.clone(),
        http: http.clone(),
        started: Instant::now(),
    });
    let registry = assert_ok!(registry);

    let gateway = Arc::new(SignalGateway::new(signal, http));
    build_dispatcher(&bot, registry, gate, gateway)
}

/// Direct-message origin from `invoker`.
pub fn origin(invoker: &str) -> MessageOrigin {
    MessageOrigin {
        invoker_id: invoker.into(),
        invoker_name: Some("Ann".into()),
        destination: invoker.into(),
        message: MessageRef {
            author: invoker.into(),
            id: 1677652288000,
        },
        quoted: None,
    }
}

/// Origin that replies to a message from `author`.
pub fn quoting_origin(invoker: &str, author: &str) -> MessageOrigin {
    MessageOrigin {
        quoted: Some(QuotedMessage {
            author: author.into(),
            id: 1677652200000,
            text: Some("hello".into()),
        }),
        ..origin(invoker)
    }
}

/// Text bodies of every `/v2/send` request the Signal mock received.
pub async fn sent_messages(signal: &MockServer) -> Vec<serde_json::Value> {
    signal
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/v2/send")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

pub fn message_text(body: &serde_json::Value) -> &str {
    body["message"].as_str().unwrap_or_default()
}
