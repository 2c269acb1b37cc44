use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::warn;

use super::{MemoryProbe, MemoryReading};

/// Live and peak heap bytes with a resettable baseline.
#[derive(Debug)]
pub struct AllocationTracker {
    current: AtomicUsize,
    peak: AtomicUsize,
    baseline: AtomicUsize,
    active: AtomicBool,
}

/// Tracker fed by [`TrackingAllocator`] when it is the global allocator.
pub static TRACKER: AllocationTracker = AllocationTracker::new();

impl AllocationTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            baseline: AtomicUsize::new(0),
            active: AtomicBool::new(false),
        }
    }

    pub fn record_alloc(&self, size: usize) {
        let current = self
            .current
            .fetch_add(size, Ordering::SeqCst)
            .saturating_add(size);
        self.peak.fetch_max(current, Ordering::SeqCst);
        if !self.active.load(Ordering::Relaxed) {
            self.active.store(true, Ordering::Relaxed);
        }
    }

    pub fn record_dealloc(&self, size: usize) {
        self.current.fetch_sub(size, Ordering::SeqCst);
    }

    pub fn record_realloc(&self, old: usize, new: usize) {
        if new > old {
            self.record_alloc(new.saturating_sub(old));
        } else if old > new {
            self.record_dealloc(old.saturating_sub(new));
        }
    }

    pub fn reset(&self) {
        let current = self.current.load(Ordering::SeqCst);
        self.baseline.store(current, Ordering::SeqCst);
        self.peak.store(current, Ordering::SeqCst);
    }

    /// Whether any allocation has been recorded.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn reading(&self) -> MemoryReading {
        let baseline = self.baseline.load(Ordering::SeqCst);
        let current = self.current.load(Ordering::SeqCst).saturating_sub(baseline);
        let peak = self
            .peak
            .load(Ordering::SeqCst)
            .saturating_sub(baseline)
            .max(current);
        MemoryReading {
            current_bytes: u64::try_from(current).unwrap_or(u64::MAX),
            peak_bytes: u64::try_from(peak).unwrap_or(u64::MAX),
        }
    }
}

impl Default for AllocationTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Global allocator wrapper that reports every size change to [`TRACKER`].
#[derive(Debug, Default)]
pub struct TrackingAllocator<A = System> {
    inner: A,
}

impl<A> TrackingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }
}

// SAFETY: every call is forwarded unchanged to the inner allocator; the
// tracker only observes sizes.
unsafe impl<A: GlobalAlloc> GlobalAlloc for TrackingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: the caller upholds `GlobalAlloc::alloc`'s contract.
        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() {
            TRACKER.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: `ptr` was returned by this allocator with `layout`.
        unsafe { self.inner.dealloc(ptr, layout) };
        TRACKER.record_dealloc(layout.size());
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: the caller upholds `GlobalAlloc::alloc_zeroed`'s contract.
        let ptr = unsafe { self.inner.alloc_zeroed(layout) };
        if !ptr.is_null() {
            TRACKER.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: `ptr` was returned by this allocator with `layout`.
        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            TRACKER.record_realloc(layout.size(), new_size);
        }
        new_ptr
    }
}

/// Heap probe backed by an [`AllocationTracker`].
#[derive(Debug, Clone, Copy)]
pub struct AllocationProbe {
    tracker: &'static AllocationTracker,
}

impl AllocationProbe {
    #[must_use]
    pub const fn new(tracker: &'static AllocationTracker) -> Self {
        Self { tracker }
    }

    /// Probe over [`TRACKER`].
    #[must_use]
    pub fn global() -> Self {
        if !TRACKER.is_active() {
            warn!("Allocation probe selected but the tracking allocator is not installed; readings will be zero.");
        }
        Self::new(&TRACKER)
    }
}

impl MemoryProbe for AllocationProbe {
    fn name(&self) -> &'static str {
        "alloc"
    }

    fn reset(&self) {
        self.tracker.reset();
    }

    fn read(&self) -> MemoryReading {
        self.tracker.reading()
    }
}
