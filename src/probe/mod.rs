//! Process-wide memory probes read at run boundaries.
//!
//! Both probes observe only the harness process. Memory held by
//! process-pool children is not counted.
mod alloc;
mod rss;

use std::sync::Arc;

use crate::args::ProbeKind;

pub use alloc::{AllocationProbe, AllocationTracker, TRACKER, TrackingAllocator};
pub use rss::RssProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryReading {
    pub current_bytes: u64,
    pub peak_bytes: u64,
}

pub trait MemoryProbe: Send + Sync {
    fn name(&self) -> &'static str;

    /// Starts a new measurement window at the current usage.
    fn reset(&self);

    /// Usage since the last reset. `peak_bytes >= current_bytes` always holds.
    fn read(&self) -> MemoryReading;
}

#[must_use]
pub fn build(kind: ProbeKind) -> Arc<dyn MemoryProbe> {
    match kind {
        ProbeKind::Alloc => Arc::new(AllocationProbe::global()),
        ProbeKind::Rss => Arc::new(RssProbe::new()),
    }
}
