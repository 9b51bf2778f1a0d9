//! Permission gate for elevated commands.

use crate::types::CommandDescriptor;
use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Immutable snapshot of privileged identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegedSet {
    owners: BTreeSet<String>,
    sudo: BTreeSet<String>,
}

impl PrivilegedSet {
    pub fn contains(&self, identity: &str) -> bool {
        let identity = normalize(identity);
        self.owners.contains(identity) || self.sudo.contains(identity)
    }

    /// Whether `invoker_id` may run `descriptor` under this snapshot.
    pub fn allows(&self, descriptor: &CommandDescriptor, invoker_id: &str) -> bool {
        !descriptor.requires_elevated || self.contains(invoker_id)
    }

    pub fn is_owner(&self, identity: &str) -> bool {
        self.owners.contains(normalize(identity))
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.owners.iter().map(|s| s.as_str())
    }

    pub fn sudo(&self) -> impl Iterator<Item = &str> {
        self.sudo.iter().map(|s| s.as_str())
    }
}

/// Outcome of a grant or revoke request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Applied,
    Unchanged,
    /// Owners are fixed by configuration.
    OwnerLocked,
}

/// Decides whether an invoker may run a command.
///
/// Readers take the current snapshot; updates build a new snapshot and swap
/// it in whole.
#[derive(Debug, Default)]
pub struct PermissionGate {
    current: RwLock<Arc<PrivilegedSet>>,
}

impl PermissionGate {
    /// Create a gate with a fixed owner set.
    pub fn new<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owners = owners
            .into_iter()
            .map(|o| normalize(o.as_ref()).to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Self {
            current: RwLock::new(Arc::new(PrivilegedSet {
                owners,
                sudo: BTreeSet::new(),
            })),
        }
    }

    /// Current privileged set.
    pub fn snapshot(&self) -> Arc<PrivilegedSet> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `invoker_id` may run `descriptor`.
    pub fn is_allowed(&self, descriptor: &CommandDescriptor, invoker_id: &str) -> bool {
        self.snapshot().allows(descriptor, invoker_id)
    }

    /// Grant runtime privileges to an identity.
    pub fn grant(&self, identity: &str) -> Change {
        let identity = normalize(identity);
        self.update(|set| {
            if set.contains(identity) {
                return None;
            }
            let mut next = set.clone();
            next.sudo.insert(identity.to_string());
            Some(next)
        })
        .map(|_| {
            info!(identity = %identity, "Granted elevated access");
            Change::Applied
        })
        .unwrap_or(Change::Unchanged)
    }

    /// Revoke runtime privileges. Owners cannot be revoked.
    pub fn revoke(&self, identity: &str) -> Change {
        let identity = normalize(identity);
        if self.snapshot().is_owner(identity) {
            return Change::OwnerLocked;
        }
        self.update(|set| {
            if !set.sudo.contains(identity) {
                return None;
            }
            let mut next = set.clone();
            next.sudo.remove(identity);
            Some(next)
        })
        .map(|_| {
            info!(identity = %identity, "Revoked elevated access");
            Change::Applied
        })
        .unwrap_or(Change::Unchanged)
    }

    fn update<F>(&self, f: F) -> Option<Arc<PrivilegedSet>>
    where
        F: FnOnce(&PrivilegedSet) -> Option<PrivilegedSet>,
    {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(f(&**guard)?);
        *guard = next.clone();
        Some(next)
    }
}

fn normalize(identity: &str) -> &str {
    identity.trim()
}
