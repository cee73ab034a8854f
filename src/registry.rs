//! Process-wide table of the issue trackers this crate offers to a host

use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::tracker::{self, FieldSchema};

/// What a host needs to list a tracker and render its setup form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerDescriptor {
    pub label: &'static str,
    pub note: &'static str,
    pub fields: FieldSchema,
    pub comments_allowed: bool,
    /// Still accepted for existing configurations, not offered for new ones
    pub deprecated: bool,
}

static REGISTRY: Lazy<RwLock<BTreeMap<&'static str, TrackerDescriptor>>> =
    Lazy::new(|| RwLock::new(BTreeMap::new()));

/// Adds `descriptor` unless its label is already taken. Returns whether it
/// was inserted.
pub fn register(descriptor: TrackerDescriptor) -> bool {
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if registry.contains_key(descriptor.label) {
        return false;
    }

    debug!(label = descriptor.label, "Registering issue tracker");
    registry.insert(descriptor.label, descriptor);
    true
}

/// Registers the trackers shipped with this crate; repeated calls are no-ops
pub fn register_builtin() {
    register(tracker::DESCRIPTOR);
    register(tracker::legacy::DESCRIPTOR);
}

pub fn lookup(label: &str) -> Option<TrackerDescriptor> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(label)
        .copied()
}

/// All registered trackers, ordered by label
pub fn descriptors() -> Vec<TrackerDescriptor> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .copied()
        .collect()
}
