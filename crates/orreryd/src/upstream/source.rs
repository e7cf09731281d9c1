//! Capability handles through which handlers read simulation state.

use std::sync::{Arc, PoisonError, RwLock};

use super::model::Snapshot;

/// Read-only access to the latest simulation snapshot.
///
/// Handlers take one snapshot per call; two calls may observe different state.
pub trait SnapshotSource: Send + Sync {
    /// The current snapshot, or `None` when no simulation is loaded.
    fn current(&self) -> Option<Arc<Snapshot>>;
}

impl<T> SnapshotSource for Arc<T>
where
    T: SnapshotSource + ?Sized,
{
    fn current(&self) -> Option<Arc<Snapshot>> {
        (**self).current()
    }
}

/// Slot a simulation loop publishes snapshots into.
///
/// Readers only clone the inner `Arc`, so publishing never blocks on a slow
/// request.
#[derive(Debug, Default)]
pub struct SharedSnapshot {
    slot: RwLock<Option<Arc<Snapshot>>>,
}

impl SharedSnapshot {
    /// Creates an empty slot; state-dependent methods report the upstream as
    /// unavailable until something is published.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot that already holds `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            slot: RwLock::new(Some(Arc::new(snapshot))),
        }
    }

    /// Replaces the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(snapshot));
    }

    /// Drops the current snapshot, e.g. when the simulation returns to its menu.
    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}

impl SnapshotSource for SharedSnapshot {
    fn current(&self) -> Option<Arc<Snapshot>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::sample_snapshot;

    #[test]
    fn empty_slot_reports_unavailable() {
        assert!(SharedSnapshot::new().current().is_none());
    }

    #[test]
    fn published_snapshot_is_visible_until_cleared() {
        let shared = SharedSnapshot::new();
        shared.publish(sample_snapshot());
        let seen = shared.current().expect("published snapshot");
        assert_eq!(seen.galaxy.seed, sample_snapshot().galaxy.seed);

        shared.clear();
        assert!(shared.current().is_none());
    }

    #[test]
    fn readers_keep_their_snapshot_across_publishes() {
        let shared = SharedSnapshot::with_snapshot(sample_snapshot());
        let before = shared.current().expect("initial snapshot");

        let mut next = sample_snapshot();
        next.galaxy.seed = 7;
        shared.publish(next);

        assert_eq!(before.galaxy.seed, sample_snapshot().galaxy.seed);
        assert_eq!(shared.current().expect("next").galaxy.seed, 7);
    }
}
