use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::{MemoryProbe, MemoryReading};

/// Resident set size of the harness process, relative to the last reset.
///
/// Reset clears the kernel's high-water mark and records the resident size
/// at that moment. Reads subtract it, so only growth within one run shows.
/// Reports zeros outside Linux.
#[derive(Debug, Default)]
pub struct RssProbe {
    baseline_bytes: AtomicU64,
}

impl RssProbe {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            baseline_bytes: AtomicU64::new(0),
        }
    }
}

impl MemoryProbe for RssProbe {
    fn name(&self) -> &'static str {
        "rss"
    }

    fn reset(&self) {
        #[cfg(target_os = "linux")]
        if let Err(err) = std::fs::write("/proc/self/clear_refs", "5") {
            debug!("Failed to reset RSS high-water mark: {}", err);
        }
        self.baseline_bytes
            .store(read_rss_bytes().unwrap_or(0), Ordering::SeqCst);
    }

    fn read(&self) -> MemoryReading {
        let baseline = self.baseline_bytes.load(Ordering::SeqCst);
        let current_bytes = read_rss_bytes().unwrap_or(0).saturating_sub(baseline);
        // VmHWM stays at its old value when clear_refs is refused.
        let peak_bytes = read_hwm_bytes()
            .unwrap_or(0)
            .saturating_sub(baseline)
            .max(current_bytes);
        MemoryReading {
            current_bytes,
            peak_bytes,
        }
    }
}

fn read_rss_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let mut parts = statm.split_whitespace();
        let _size = parts.next()?;
        let resident = parts.next()?.parse::<u64>().ok()?;
        // SAFETY: sysconf is safe to call; we only read the page size.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if page_size <= 0 {
            return None;
        }
        let page_size = u64::try_from(page_size).ok()?;
        Some(resident.saturating_mul(page_size))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

fn read_hwm_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        status.lines().find_map(parse_hwm_line)
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

fn parse_hwm_line(line: &str) -> Option<u64> {
    let value = line.strip_prefix("VmHWM:")?;
    let kilobytes = value.trim().strip_suffix("kB")?.trim().parse::<u64>().ok()?;
    Some(kilobytes.saturating_mul(1024))
}
