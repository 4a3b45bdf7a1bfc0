//! Copy-out failures on the output endpoint

use charbuf::{CopyFault, CopyOut, DeviceConfig, DevicePair, DrainError, NoopObserver, EFAULT};
use std::sync::Arc;

/// Destination that rejects every copy
struct Unwritable;

impl CopyOut for Unwritable {
    fn copy_out(&mut self, bytes: &[u8]) -> Result<(), CopyFault> {
        Err(CopyFault {
            needed: bytes.len(),
        })
    }
}

/// Destination that accepts a configured number of copies, then fails
struct FailAfter {
    remaining: usize,
    data: Vec<u8>,
}

impl CopyOut for FailAfter {
    fn copy_out(&mut self, bytes: &[u8]) -> Result<(), CopyFault> {
        if self.remaining == 0 {
            return Err(CopyFault {
                needed: bytes.len(),
            });
        }
        self.remaining -= 1;
        self.data.extend_from_slice(bytes);
        Ok(())
    }
}

fn quiet_pair() -> DevicePair {
    DevicePair::with_observer(DeviceConfig::default(), Arc::new(NoopObserver))
}

#[test]
fn test_fault_leaves_buffer_unchanged() {
    let pair = quiet_pair();
    pair.input().append(b"precious");

    let result = pair.output().drain(&mut Unwritable, 5);
    assert_eq!(result, Err(DrainError::Fault { requested: 5 }));

    let guard = pair.buffer().acquire();
    assert_eq!(&*guard, b"precious");
}

#[test]
fn test_fault_releases_lock() {
    let pair = quiet_pair();
    pair.input().append(b"data");

    assert!(pair.output().drain(&mut Unwritable, 4).is_err());
    assert!(pair.buffer().try_acquire().is_some());

    // Both endpoints keep working afterwards
    assert_eq!(pair.input().append(b"more"), 4);
    let mut out = Vec::new();
    assert_eq!(pair.output().drain(&mut out, 100), Ok(8));
    assert_eq!(out, b"datamore");
}

#[test]
fn test_empty_buffer_never_faults() {
    let pair = quiet_pair();
    assert_eq!(pair.output().drain(&mut Unwritable, 10), Ok(0));

    pair.input().append(b"x");
    assert_eq!(pair.output().drain(&mut Unwritable, 0), Ok(0));
}

#[test]
fn test_fault_after_successful_drains() {
    let pair = quiet_pair();
    pair.input().append(b"aabbcc");

    let mut dest = FailAfter {
        remaining: 2,
        data: Vec::new(),
    };
    assert_eq!(pair.output().drain(&mut dest, 2), Ok(2));
    assert_eq!(pair.output().drain(&mut dest, 2), Ok(2));
    assert!(pair.output().drain(&mut dest, 2).is_err());

    assert_eq!(dest.data, b"aabb");
    assert_eq!(&*pair.buffer().acquire(), b"cc");
}

#[test]
fn test_fault_errno() {
    let err = DrainError::Fault { requested: 3 };
    assert_eq!(err.errno(), EFAULT);
    assert_eq!(err.to_string(), "failed to copy 3 bytes to the destination");
    assert_eq!(embedded_io::Error::kind(&err), embedded_io::ErrorKind::Other);
}

#[test]
fn test_slice_too_short_is_a_fault() {
    let pair = quiet_pair();
    pair.input().append(b"0123456789");

    let mut small = [0u8; 3];
    assert_eq!(
        pair.output().drain(&mut small[..], 10),
        Err(DrainError::Fault { requested: 10 })
    );
    assert_eq!(pair.output().read_posix(&mut small, 10), -(EFAULT as isize));
    assert_eq!(pair.buffer().len(), 10);
}
