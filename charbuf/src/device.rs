//! Device pair: one shared buffer wired to one input and one output endpoint
//!
//! Stands in for loading the pair of character devices. The buffer is
//! created here and injected into both endpoints; nothing is registered
//! with the operating system.

use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::buffer::SharedBuffer;
use crate::input::InputEndpoint;
use crate::observer::{BufferObserver, TracingObserver};
use crate::output::OutputEndpoint;

pub const INPUT_DEVICE_NAME: &str = "charbuf_in";
pub const OUTPUT_DEVICE_NAME: &str = "charbuf_out";

/// Names of the two endpoints, used in log output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub input_name: String,
    pub output_name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            input_name: INPUT_DEVICE_NAME.to_string(),
            output_name: OUTPUT_DEVICE_NAME.to_string(),
        }
    }
}

/// Owner of the shared buffer and its two endpoints
///
/// # Example
///
/// ```
/// use charbuf::{DeviceConfig, DevicePair};
///
/// let pair = DevicePair::new(DeviceConfig::default());
/// let input = pair.input().open();
/// let output = pair.output().open();
///
/// assert_eq!(input.append(b"hello"), 5);
///
/// let mut buf = [0u8; 16];
/// assert_eq!(output.drain(&mut buf).unwrap(), 5);
/// assert_eq!(&buf[..5], b"hello");
/// ```
pub struct DevicePair {
    buffer: Arc<SharedBuffer>,
    input: Arc<InputEndpoint>,
    output: Arc<OutputEndpoint>,
}

impl DevicePair {
    /// Create the pair with events logged through `tracing`
    #[must_use]
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Create the pair with a custom observer shared by both endpoints
    #[must_use]
    pub fn with_observer(config: DeviceConfig, observer: Arc<dyn BufferObserver>) -> Self {
        let buffer = Arc::new(SharedBuffer::new());
        info!(
            input = %config.input_name,
            output = %config.output_name,
            capacity = buffer.capacity(),
            "installing device pair"
        );

        let input = Arc::new(InputEndpoint::new(
            &config.input_name,
            Arc::clone(&buffer),
            Arc::clone(&observer),
        ));
        let output = Arc::new(OutputEndpoint::new(
            &config.output_name,
            Arc::clone(&buffer),
            observer,
        ));

        Self {
            buffer,
            input,
            output,
        }
    }

    #[must_use]
    pub fn input(&self) -> &Arc<InputEndpoint> {
        &self.input
    }

    #[must_use]
    pub fn output(&self) -> &Arc<OutputEndpoint> {
        &self.output
    }

    #[must_use]
    pub fn buffer(&self) -> &Arc<SharedBuffer> {
        &self.buffer
    }
}

impl Default for DevicePair {
    fn default() -> Self {
        Self::new(DeviceConfig::default())
    }
}

impl fmt::Debug for DevicePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevicePair(input={:?}, output={:?})", self.input, self.output)
    }
}

impl Drop for DevicePair {
    fn drop(&mut self) {
        for (name, live) in [
            (self.input.name(), self.input.lifecycle().live_handles()),
            (self.output.name(), self.output.lifecycle().live_handles()),
        ] {
            if live > 0 {
                log::warn!("{name}: removing device with {live} open handle(s)");
            }
        }
        info!(
            input = %self.input.name(),
            output = %self.output.name(),
            "removing device pair"
        );
    }
}
