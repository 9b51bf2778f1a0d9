//! Signal command bot - main entry point.

use anyhow::Context;
use command_bot::commands::{build_dispatcher, build_registry, CommandDeps};
use command_bot::config::Config;
use command_bot::context::SignalContextAssembler;
use command_bot::error::AppResult;
use command_bot::gateway::SignalGateway;
use command_core::{ContextAssembler, PermissionGate};
use signal_client::{MessageReceiver, SignalClient};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    let started = Instant::now();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level, &config.bot.log_format);

    info!("Starting {}...", config.bot.name);

    let signal = SignalClient::new(&config.signal.service_url, &config.signal.phone_number)
        .context("Failed to create Signal client")?;

    if !signal.health_check().await {
        error!("Signal API not reachable at {}", config.signal.service_url);
        return Err(anyhow::anyhow!("Signal API not reachable").into());
    }
    info!("Signal API healthy");

    let http = reqwest::Client::builder()
        .timeout(config.download.timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let owners = config.bot.owner_ids();
    if owners.is_empty() {
        warn!("No owners configured - elevated commands are unavailable until BOT__OWNERS is set");
    }
    let gate = Arc::new(PermissionGate::new(&owners));

    // Duplicate command names abort startup here.
    let registry = build_registry(&CommandDeps {
        config: config.clone(),
        gate: gate.clone(),
        http: http.clone(),
        started,
    })?;

    info!(
        "Registered {} commands: {}",
        registry.len(),
        registry.names().join(", ")
    );

    let gateway = Arc::new(SignalGateway::new(signal.clone(), http));
    let dispatcher = Arc::new(build_dispatcher(&config.bot, registry, gate, gateway));
    let assembler = SignalContextAssembler;
    let own_number = signal.phone_number().to_string();

    info!("Listening for messages...");

    // Start message receiver
    let receiver = MessageReceiver::new(signal, config.signal.poll_interval)
        .with_error_backoff(config.signal.error_backoff);
    let mut stream = Box::pin(receiver.stream());

    // Main message loop
    loop {
        tokio::select! {
            Some(message) = stream.next() => {
                if message.source == own_number {
                    debug!("Ignoring own message");
                    continue;
                }

                let origin = assembler.assemble(&message);
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let outcome = dispatcher.dispatch(&message.text, origin).await;
                    debug!(?outcome, "Dispatch finished");
                });
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
