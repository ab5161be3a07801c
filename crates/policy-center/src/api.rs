use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use crate::errors::PolicyError;
use crate::loader::{load_snapshot_with_options, LoadOptions};
use crate::model::PolicySnapshot;

/// Process-wide holder of the current policy snapshot.
///
/// Readers take an `Arc` to a whole snapshot; replacement swaps the pointer,
/// so a reader never sees one table from revision N and the other from N+1.
pub struct PolicyCenter {
    current: ArcSwap<PolicySnapshot>,
}

impl PolicyCenter {
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        self.current.load_full()
    }

    pub fn revision(&self) -> u64 {
        self.current.load().rev
    }

    /// Install `next` as a whole, bumping the revision past the current one.
    pub fn swap(&self, next: PolicySnapshot) -> Arc<PolicySnapshot> {
        self.current.rcu(|previous| {
            let mut staged = next.clone();
            staged.rev = previous.rev.saturating_add(1);
            staged
        });
        let installed = self.snapshot();
        info!(rev = installed.rev, source = ?installed.source, "policy snapshot installed");
        installed
    }

    pub fn reload(&self, options: &LoadOptions) -> Result<Arc<PolicySnapshot>, PolicyError> {
        let next = load_snapshot_with_options(options)?;
        Ok(self.swap(next))
    }
}

impl Default for PolicyCenter {
    fn default() -> Self {
        Self::new(crate::defaults::default_snapshot())
    }
}
