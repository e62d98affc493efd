use std::collections::HashSet;
use tracing::debug;

use crate::types::LightId;

/// Lights that were deleted but may still be enumerated by the host
///
/// Only touched from the host's event thread, so no locking.
#[derive(Debug, Default)]
pub struct BlacklistTracker {
    deleted: HashSet<LightId>,
}

impl BlacklistTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent
    pub fn add(&mut self, id: LightId) {
        if self.deleted.insert(id) {
            debug!(light = %id, "Blacklisted deleted light");
        }
    }

    /// No-op for ids that were never added
    pub fn remove(&mut self, id: LightId) {
        if self.deleted.remove(&id) {
            debug!(light = %id, "Removed undeleted light from blacklist");
        }
    }

    pub fn contains(&self, id: LightId) -> bool {
        self.deleted.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
    }
}
