//! Atomic bind counters

use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::BindCounters;

/// Lock-free bind counters
#[derive(Debug, Default)]
pub struct AtomicBindCounters {
    anonymous_binds: AtomicU64,
}

impl AtomicBindCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anonymous binds accepted so far
    pub fn anonymous_binds(&self) -> u64 {
        self.anonymous_binds.load(Ordering::Relaxed)
    }
}

impl BindCounters for AtomicBindCounters {
    fn increment_anonymous_binds(&self) {
        self.anonymous_binds.fetch_add(1, Ordering::Relaxed);
    }
}
