//! Signal command bot: configuration, gateway binding and commands.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod gateway;
pub mod github;
pub mod providers;
