//! Command registration, permission gating, dispatch and provider fallback
//! for chat bots.

mod dispatcher;
mod error;
mod fallback;
mod gateway;
mod permissions;
mod registry;
mod types;

pub use dispatcher::{DispatchOutcome, Dispatcher, DENIAL_REPLY, FAILURE_REPLY};
pub use error::*;
pub use fallback::*;
pub use gateway::*;
pub use permissions::{Change, PermissionGate, PrivilegedSet};
pub use registry::CommandRegistry;
pub use types::*;
