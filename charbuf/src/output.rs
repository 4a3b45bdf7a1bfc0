//! Output endpoint: removes bytes from the head of the shared buffer
//!
//! A drain copies out `min(requested, len)` bytes, then shifts the rest of
//! the buffer down. If the copy fails the buffer is left exactly as it was.

use std::fmt;
use std::sync::Arc;
use std::thread;

use crate::buffer::SharedBuffer;
use crate::error::{CopyFault, DrainError};
use crate::lifecycle::EndpointLifecycle;
use crate::observer::{BufferEvent, BufferObserver};

/// Destination of a drain
///
/// `copy_out` receives exactly the bytes being removed. Returning an error
/// aborts the drain with no change to the buffer.
pub trait CopyOut {
    /// Store `bytes` at the start of the destination
    ///
    /// # Errors
    /// Returns [`CopyFault`] if the destination cannot take all of `bytes`.
    fn copy_out(&mut self, bytes: &[u8]) -> Result<(), CopyFault>;
}

/// Fills the slice from offset 0; faults if the slice is too short
impl CopyOut for [u8] {
    fn copy_out(&mut self, bytes: &[u8]) -> Result<(), CopyFault> {
        let dest = self.get_mut(..bytes.len()).ok_or(CopyFault {
            needed: bytes.len(),
        })?;
        dest.copy_from_slice(bytes);
        Ok(())
    }
}

impl<const N: usize> CopyOut for [u8; N] {
    fn copy_out(&mut self, bytes: &[u8]) -> Result<(), CopyFault> {
        self.as_mut_slice().copy_out(bytes)
    }
}

/// Appends; never faults
impl CopyOut for Vec<u8> {
    fn copy_out(&mut self, bytes: &[u8]) -> Result<(), CopyFault> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Read side of the device pair
///
/// # Thread Safety
///
/// Like [`crate::InputEndpoint`], every call is a single critical section on
/// the buffer lock and the endpoint can be shared between threads.
pub struct OutputEndpoint {
    name: String,
    buffer: Arc<SharedBuffer>,
    observer: Arc<dyn BufferObserver>,
    lifecycle: EndpointLifecycle,
}

impl OutputEndpoint {
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

    /// Move up to `requested_max` bytes from the buffer into `dest`
    ///
    /// Returns the number of bytes produced; 0 when the buffer is empty or
    /// `requested_max` is 0. On success the remaining bytes move to the head
    /// of the buffer.
    ///
    /// # Errors
    /// [`DrainError::Fault`] if `dest` rejects the copy. The buffer is not
    /// modified in that case and the lock is released.
    pub fn drain<D: CopyOut + ?Sized>(
        &self,
        dest: &mut D,
        requested_max: usize,
    ) -> Result<usize, DrainError> {
        self.observer.on_event(&self.name, BufferEvent::WaitingOnLock);
        let outcome = {
            let mut guard = self.buffer.acquire();
            self.observer.on_event(&self.name, BufferEvent::LockAcquired);

            let count = requested_max.min(guard.len());
            if count == 0 {
                self.observer.on_event(&self.name, BufferEvent::Empty);
                Ok(0)
            } else {
                match dest.copy_out(&guard[..count]) {
                    Ok(()) => {
                        guard.consume(count);
                        Ok(count)
                    }
                    Err(fault) => Err(DrainError::from(fault)),
                }
            }
        };
        self.observer.on_event(&self.name, BufferEvent::LockReleased);

        match outcome {
            Ok(n) => self.observer.on_event(&self.name, BufferEvent::Read(n)),
            Err(DrainError::Fault { requested }) => {
                self.observer.on_event(&self.name, BufferEvent::Fault { requested });
            }
        }
        outcome
    }

    /// Drain into `buf`, up to its length
    ///
    /// # Errors
    /// See [`OutputEndpoint::drain`].
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, DrainError> {
        let max = buf.len();
        self.drain(buf, max)
    }

    /// Drain (POSIX-style)
    ///
    /// Returns:
    /// - Positive value: number of bytes read
    /// - 0: buffer empty, or `max` is 0
    /// - `-EFAULT`: `buf` cannot hold the bytes; nothing was removed
    ///
    /// `max` may exceed `buf.len()`, like a length argument that does not
    /// match the user buffer. That only faults if more than `buf.len()`
    /// bytes are actually available.
    #[must_use]
    pub fn read_posix(&self, buf: &mut [u8], max: usize) -> isize {
        match self.drain(buf, max) {
            Ok(n) => n.cast_signed(),
            Err(e) => -(e.errno() as isize),
        }
    }

    /// Open the endpoint; the returned handle closes it on drop
    #[must_use]
    pub fn open(self: &Arc<Self>) -> OutputHandle {
        self.lifecycle.record_open(&self.name);
        OutputHandle {
            endpoint: Arc::clone(self),
        }
    }
}

impl fmt::Debug for OutputEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OutputEndpoint(name={}, opens={}, buffer={:?})",
            self.name,
            self.lifecycle.open_count(),
            self.buffer
        )
    }
}

/// An open output endpoint
pub struct OutputHandle {
    endpoint: Arc<OutputEndpoint>,
}

impl OutputHandle {
    /// See [`OutputEndpoint::read`]
    ///
    /// # Errors
    /// See [`OutputEndpoint::drain`].
    pub fn drain(&self, buf: &mut [u8]) -> Result<usize, DrainError> {
        self.endpoint.read(buf)
    }

    #[must_use]
    pub fn endpoint(&self) -> &Arc<OutputEndpoint> {
        &self.endpoint
    }

    /// Close the handle. Same as dropping it.
    pub fn close(self) {}
}

impl fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputHandle({})", self.endpoint.name)
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        self.endpoint.lifecycle.record_close(&self.endpoint.name);
    }
}

impl embedded_io::ErrorType for OutputHandle {
    type Error = DrainError;
}

/// Blocking adapter: yields until at least one byte is available
///
/// There is no end-of-stream on this device, so a read with nothing ever
/// written never returns. Poll `read_ready()` or use [`OutputHandle::drain`]
/// when that matters.
impl embedded_io::Read for OutputHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            let n = self.endpoint.read(buf)?;
            if n > 0 || buf.is_empty() {
                return Ok(n);
            }
            thread::yield_now();
        }
    }
}

impl embedded_io::ReadReady for OutputHandle {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.endpoint.buffer.is_empty())
    }
}
