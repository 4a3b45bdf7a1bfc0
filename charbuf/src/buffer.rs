//! Bounded shared buffer with internal locking
//!
//! One fixed-size byte region plus its fill length, both behind a single
//! `parking_lot::Mutex`. The input endpoint appends at the tail, the output
//! endpoint removes from the head and shifts the rest down.

use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::ops::Deref;

/// Capacity of the shared buffer in bytes
pub const BUFFER_LENGTH: usize = 1024;

/// Storage protected by the guard
struct Storage {
    bytes: [u8; BUFFER_LENGTH],
    len: usize,
}

/// Exclusive access to the buffer contents
///
/// Holds the lock until dropped. Dereferences to the valid bytes only
/// (`bytes[..len]`), so stale bytes past the fill length are never visible.
/// Mutation is reserved for the input and output endpoints.
pub struct BufferGuard<'a>(MutexGuard<'a, Storage>);

impl BufferGuard<'_> {
    /// Number of free bytes at the tail
    #[must_use]
    pub fn available(&self) -> usize {
        BUFFER_LENGTH - self.0.len
    }

    /// Copy `chunk` to the tail. The caller has already truncated it to fit.
    pub(crate) fn extend_from_slice(&mut self, chunk: &[u8]) {
        debug_assert!(chunk.len() <= self.available());
        let start = self.0.len;
        let end = start + chunk.len();
        self.0.bytes[start..end].copy_from_slice(chunk);
        self.0.len = end;
    }

    /// Drop `count` bytes from the head and shift the remainder to offset 0
    pub(crate) fn consume(&mut self, count: usize) {
        debug_assert!(count <= self.0.len);
        let len = self.0.len;
        self.0.bytes.copy_within(count..len, 0);
        self.0.len = len - count;
    }
}

impl Deref for BufferGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0.bytes[..self.0.len]
    }
}

impl AsRef<[u8]> for BufferGuard<'_> {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

/// Fixed-capacity byte buffer shared by one input and one output endpoint
///
/// Invariants, observable whenever no guard is held:
/// - `0 <= len() <= BUFFER_LENGTH`
/// - only the first `len()` bytes are meaningful
///
/// The buffer is not a global. Whoever creates it hands an `Arc` to both
/// endpoints, see [`crate::DevicePair`].
///
/// # Example
///
/// ```
/// use charbuf::{SharedBuffer, BUFFER_LENGTH};
///
/// let buffer = SharedBuffer::new();
/// assert_eq!(buffer.available(), BUFFER_LENGTH);
///
/// let guard = buffer.acquire();
/// assert!(guard.is_empty());
/// // Lock released when guard goes out of scope
/// ```
pub struct SharedBuffer(Mutex<Storage>);

impl SharedBuffer {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self(Mutex::new(Storage {
            bytes: [0; BUFFER_LENGTH],
            len: 0,
        }))
    }

    /// Total capacity in bytes
    #[must_use]
    pub const fn capacity(&self) -> usize {
        BUFFER_LENGTH
    }

    /// Acquire exclusive access, blocking until the lock is free
    #[must_use]
    pub fn acquire(&self) -> BufferGuard<'_> {
        BufferGuard(self.0.lock())
    }

    /// Acquire exclusive access if nobody holds it right now
    #[must_use]
    pub fn try_acquire(&self) -> Option<BufferGuard<'_>> {
        self.0.try_lock().map(BufferGuard)
    }

    /// Number of valid bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len
    }

    /// Check if the buffer holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of free bytes
    #[must_use]
    pub fn available(&self) -> usize {
        self.acquire().available()
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_acquire() {
            Some(guard) => write!(f, "SharedBuffer(len={}, capacity={BUFFER_LENGTH})", guard.len()),
            None => write!(f, "SharedBuffer(<locked>, capacity={BUFFER_LENGTH})"),
        }
    }
}
