use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Open/close counters of one endpoint
///
/// Telemetry only. Nothing here guards the shared buffer, and closing does
/// not decrement the open count.
#[derive(Debug, Default)]
pub struct EndpointLifecycle {
    opens: AtomicU64,
    closes: AtomicU64,
}

impl EndpointLifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an open and return the new total
    pub(crate) fn record_open(&self, device: &str) -> u64 {
        let opens = self.opens.fetch_add(1, Ordering::Relaxed) + 1;
        info!(device = %device, opens, "device opened");
        opens
    }

    pub(crate) fn record_close(&self, device: &str) {
        self.closes.fetch_add(1, Ordering::Relaxed);
        info!(device = %device, "device closed");
    }

    /// Number of opens so far
    #[must_use]
    pub fn open_count(&self) -> u64 {
        self.opens.load(Ordering::Relaxed)
    }

    /// Number of closes so far
    #[must_use]
    pub fn close_count(&self) -> u64 {
        self.closes.load(Ordering::Relaxed)
    }

    /// Opens not yet matched by a close (best effort)
    #[must_use]
    pub fn live_handles(&self) -> u64 {
        self.open_count().saturating_sub(self.close_count())
    }
}
