//! Error types for the output endpoint

use core::ffi::c_int;

/// "Bad address": the destination of a drain could not take the bytes
pub const EFAULT: c_int = 14;

/// The destination of a drain rejected the copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("destination cannot accept {needed} bytes")]
pub struct CopyFault {
    pub needed: usize,
}

/// Errors returned by the output endpoint
///
/// An empty buffer is not an error, it drains as `Ok(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DrainError {
    /// Copying out failed; the buffer was left untouched
    #[error("failed to copy {requested} bytes to the destination")]
    Fault { requested: usize },
}

impl DrainError {
    /// errno value reported at the POSIX-style boundary
    #[must_use]
    pub fn errno(&self) -> c_int {
        match self {
            Self::Fault { .. } => EFAULT,
        }
    }
}

impl From<CopyFault> for DrainError {
    fn from(e: CopyFault) -> Self {
        Self::Fault {
            requested: e.needed,
        }
    }
}

impl embedded_io::Error for DrainError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}
