//! Input endpoint: appends caller bytes to the shared buffer
//!
//! Overflow is not an error. A chunk that does not fit is truncated to the
//! free space and the rest is dropped; the return value tells the caller how
//! much was taken so it can retry the remainder itself.

use core::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::thread;

use crate::buffer::SharedBuffer;
use crate::lifecycle::EndpointLifecycle;
use crate::observer::{BufferEvent, BufferObserver};

/// Write side of the device pair
///
/// # Thread Safety
///
/// `append()` takes `&self` and may be called from any number of threads.
/// Each call is one critical section on the buffer lock, so concurrent
/// appends never interleave their bytes. The lock is not reentrant: an
/// observer calling back into the endpoint would deadlock.
pub struct InputEndpoint {
    name: String,
    buffer: Arc<SharedBuffer>,
    observer: Arc<dyn BufferObserver>,
    lifecycle: EndpointLifecycle,
}

impl InputEndpoint {
    #[must_use]
    pub fn new(name: &str, buffer: Arc<SharedBuffer>, observer: Arc<dyn BufferObserver>) -> Self {
        Self {
            name: name.to_string(),
            buffer,
            observer,
            lifecycle: EndpointLifecycle::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn lifecycle(&self) -> &EndpointLifecycle {
        &self.lifecycle
    }

    /// Append as much of `chunk` as fits and return the number of bytes stored
    ///
    /// Returns 0 for an empty chunk or a full buffer. Only the first
    /// `returned` bytes of `chunk` are stored.
    pub fn append(&self, chunk: &[u8]) -> usize {
        self.observer.on_event(&self.name, BufferEvent::WaitingOnLock);
        let written = {
            let mut guard = self.buffer.acquire();
            self.observer.on_event(&self.name, BufferEvent::LockAcquired);

            let written = chunk.len().min(guard.available());
            if written < chunk.len() {
                self.observer.on_event(
                    &self.name,
                    BufferEvent::Truncated {
                        requested: chunk.len(),
                        accepted: written,
                    },
                );
            }
            guard.extend_from_slice(&chunk[..written]);
            written
        };
        self.observer.on_event(&self.name, BufferEvent::LockReleased);
        self.observer.on_event(&self.name, BufferEvent::Wrote(written));
        written
    }

    /// Append (POSIX-style)
    ///
    /// Returns the accepted count, which is never negative: a write on this
    /// endpoint cannot fail.
    #[must_use]
    pub fn write_posix(&self, chunk: &[u8]) -> isize {
        self.append(chunk).cast_signed()
    }

    /// Open the endpoint; the returned handle closes it on drop
    #[must_use]
    pub fn open(self: &Arc<Self>) -> InputHandle {
        self.lifecycle.record_open(&self.name);
        InputHandle {
            endpoint: Arc::clone(self),
        }
    }
}

impl fmt::Debug for InputEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InputEndpoint(name={}, opens={}, buffer={:?})",
            self.name,
            self.lifecycle.open_count(),
            self.buffer
        )
    }
}

/// An open input endpoint
pub struct InputHandle {
    endpoint: Arc<InputEndpoint>,
}

impl InputHandle {
    /// See [`InputEndpoint::append`]
    pub fn append(&self, chunk: &[u8]) -> usize {
        self.endpoint.append(chunk)
    }

    #[must_use]
    pub fn endpoint(&self) -> &Arc<InputEndpoint> {
        &self.endpoint
    }

    /// Close the handle. Same as dropping it.
    pub fn close(self) {}
}

impl fmt::Debug for InputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputHandle({})", self.endpoint.name)
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.endpoint.lifecycle.record_close(&self.endpoint.name);
    }
}

impl embedded_io::ErrorType for InputHandle {
    type Error = Infallible;
}

/// Blocking adapter: yields until at least one byte of a non-empty `buf` fits
///
/// `append()` itself never waits; this loop is the caller-side retry that
/// `embedded_io::Write` requires, since it forbids `Ok(0)` for non-empty input.
impl embedded_io::Write for InputHandle {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        loop {
            let n = self.endpoint.append(buf);
            if n > 0 || buf.is_empty() {
                return Ok(n);
            }
            thread::yield_now();
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_io::WriteReady for InputHandle {
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.endpoint.buffer.available() > 0)
    }
}
