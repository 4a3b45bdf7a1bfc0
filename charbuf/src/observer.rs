//! Observability hook for the append and drain paths
//!
//! The paths report what they are doing through [`BufferObserver`]. The
//! observer never receives the guard and must not touch the buffer: some
//! events fire while the calling path holds the lock.

use tracing::{debug, trace, warn};

/// Step or outcome of an append/drain call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferEvent {
    /// About to block on the buffer lock (lock not held)
    WaitingOnLock,
    /// Lock acquired (lock held)
    LockAcquired,
    /// Append did not fit; the excess is dropped (lock held)
    Truncated { requested: usize, accepted: usize },
    /// Drain found nothing to return (lock held)
    Empty,
    /// Lock released (lock not held)
    LockReleased,
    /// Append finished (lock not held)
    Wrote(usize),
    /// Drain finished (lock not held)
    Read(usize),
    /// Drain failed to copy out; nothing was removed (lock not held)
    Fault { requested: usize },
}

/// Receives [`BufferEvent`]s from an endpoint named `device`
pub trait BufferObserver: Send + Sync {
    fn on_event(&self, device: &str, event: BufferEvent);
}

/// Logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BufferObserver for TracingObserver {
    fn on_event(&self, device: &str, event: BufferEvent) {
        match event {
            BufferEvent::WaitingOnLock => trace!(device = %device, "waiting on lock"),
            BufferEvent::LockAcquired => trace!(device = %device, "lock acquired"),
            BufferEvent::LockReleased => trace!(device = %device, "lock released"),
            BufferEvent::Truncated {
                requested,
                accepted,
            } => debug!(
                device = %device,
                requested,
                accepted,
                "not enough space left in the buffer, dropping the rest"
            ),
            BufferEvent::Empty => debug!(device = %device, "buffer is empty"),
            BufferEvent::Wrote(n) => debug!(device = %device, bytes = n, "wrote"),
            BufferEvent::Read(n) => debug!(device = %device, bytes = n, "read"),
            BufferEvent::Fault { requested } => {
                warn!(device = %device, requested, "failed to read");
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BufferObserver for NoopObserver {
    fn on_event(&self, _device: &str, _event: BufferEvent) {}
}
