//! A fixed-capacity byte buffer shared by an input and an output endpoint
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                     ┌──────────────────┐
//! │  InputEndpoint   │                     │  OutputEndpoint  │
//! │  append()        │                     │  drain()         │
//! │  truncates when  │                     │  0 when empty,   │
//! │  full            │                     │  Fault on copy   │
//! └────────┬─────────┘                     └────────┬─────────┘
//!          │ acquire()                              │ acquire()
//!          ▼                                        ▼
//!        ┌────────────────────────────────────────────┐
//!        │  SharedBuffer                              │
//!        │  Mutex<[u8; 1024] + len>                   │
//!        └────────────────────────────────────────────┘
//! ```
//!
//! [`DevicePair`] creates the buffer and hands it to both endpoints.

pub mod buffer;
pub mod device;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod observer;
pub mod output;

pub use buffer::{BufferGuard, SharedBuffer, BUFFER_LENGTH};
pub use device::{DeviceConfig, DevicePair, INPUT_DEVICE_NAME, OUTPUT_DEVICE_NAME};
pub use error::{CopyFault, DrainError, EFAULT};
pub use input::{InputEndpoint, InputHandle};
pub use lifecycle::EndpointLifecycle;
pub use observer::{BufferEvent, BufferObserver, NoopObserver, TracingObserver};
pub use output::{CopyOut, OutputEndpoint, OutputHandle};
