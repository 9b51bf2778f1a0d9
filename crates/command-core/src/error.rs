//! Command layer errors.

use std::time::Duration;
use thiserror::Error;

use crate::fallback::ProviderAttempt;

/// Errors raised while building the command registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A command with this name is already registered.
    #[error("Command '{0}' is already registered")]
    Duplicate(String),

    /// No command with this name exists.
    #[error("Command '{0}' not found")]
    NotFound(String),
}

/// Errors from the messaging gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The transport rejected or failed the request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The platform has nothing for the requested identity or message.
    #[error("Not available: {0}")]
    Unavailable(String),

    /// Media referenced by an outbound message could not be loaded.
    #[error("Media error: {0}")]
    Media(String),
}

/// Failure of a single provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("Provider returned status {0}")]
    Status(u16),

    /// Provider answered, but without a usable resource.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider did not answer in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure of a whole fallback resolution.
#[derive(Error, Debug)]
pub enum FallbackError {
    /// The provider list was empty.
    #[error("No providers configured")]
    NoProviders,

    /// Every provider failed. Reports the last failure only.
    #[error(
        "All {} providers failed, last: {}: {}",
        .attempts.len(),
        last_provider(.attempts),
        last_reason(.attempts)
    )]
    Exhausted { attempts: Vec<ProviderAttempt> },
}

impl FallbackError {
    /// Reason the final provider gave, if any provider was tried.
    pub fn last_reason(&self) -> Option<&str> {
        match self {
            Self::NoProviders => None,
            Self::Exhausted { attempts } => attempts.last().and_then(|a| a.failure()),
        }
    }
}

fn last_provider(attempts: &[ProviderAttempt]) -> &str {
    attempts.last().map(|a| a.provider.as_str()).unwrap_or("none")
}

fn last_reason(attempts: &[ProviderAttempt]) -> &str {
    attempts.last().and_then(|a| a.failure()).unwrap_or("unknown")
}

/// Errors a command handler may return.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Provider fallback failed: {0}")]
    Fallback(#[from] FallbackError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
