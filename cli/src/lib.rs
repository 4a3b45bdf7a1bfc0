//! Pump a byte stream through a device pair
//!
//! A producer thread reads the source and appends it through the input
//! endpoint, retrying whatever the full buffer did not accept. A consumer
//! thread drains the output endpoint into the sink until the producer is done
//! and the buffer is empty.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use charbuf::{DevicePair, DrainError};
use tracing::{debug, info};

/// Default drain request size
pub const DEFAULT_CHUNK: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("drain failed: {0}")]
    Drain(#[from] DrainError),

    #[error("chunk size must be positive")]
    ZeroChunk,

    #[error("{0} thread panicked")]
    Panicked(&'static str),
}

/// Byte counts of one pump run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpStats {
    /// Bytes read from the source and accepted by the input endpoint
    pub bytes_in: usize,
    /// Bytes drained from the output endpoint into the sink
    pub bytes_out: usize,
    /// Appends that accepted less than they were given
    pub short_writes: usize,
}

/// Copy `source` to `sink` through `pair`, draining `chunk` bytes at a time
///
/// # Errors
/// Returns the first IO error from either side, or a drain fault. If the
/// consumer stops early, the producer stops as well. A panic on either side
/// is reported as [`CliError::Panicked`].
pub fn pump<R, W>(
    pair: &DevicePair,
    chunk: usize,
    source: R,
    sink: W,
) -> Result<PumpStats, CliError>
where
    R: Read + Send,
    W: Write + Send,
{
    if chunk == 0 {
        return Err(CliError::ZeroChunk);
    }

    let producer_done = AtomicBool::new(false);
    let consumer_done = AtomicBool::new(false);

    let (produced, consumed) = thread::scope(|s| {
        let producer = s.spawn(|| {
            let _done = SetOnDrop(&producer_done);
            produce(pair, chunk, source, &consumer_done)
        });
        let consumer = s.spawn(|| {
            let _done = SetOnDrop(&consumer_done);
            consume(pair, chunk, sink, &producer_done)
        });
        (producer.join(), consumer.join())
    });

    let (bytes_in, short_writes) = produced.map_err(|_| CliError::Panicked("producer"))??;
    let bytes_out = consumed.map_err(|_| CliError::Panicked("consumer"))??;

    let stats = PumpStats {
        bytes_in,
        bytes_out,
        short_writes,
    };
    info!(?stats, "pump finished");
    Ok(stats)
}

/// Raises the flag when dropped, including on unwind
struct SetOnDrop<'a>(&'a AtomicBool);

impl Drop for SetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

fn produce<R: Read>(
    pair: &DevicePair,
    chunk: usize,
    mut source: R,
    stop: &AtomicBool,
) -> Result<(usize, usize), CliError> {
    let input = pair.input().open();
    let mut buf = vec![0u8; chunk];
    let mut total = 0;
    let mut short_writes = 0;

    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        let mut rest = &buf[..n];
        while !rest.is_empty() {
            if stop.load(Ordering::Acquire) {
                debug!("consumer stopped, producer stopping");
                return Ok((total, short_writes));
            }
            let accepted = input.append(rest);
            if accepted < rest.len() {
                short_writes += 1;
                thread::yield_now();
            }
            total += accepted;
            rest = &rest[accepted..];
        }
    }

    Ok((total, short_writes))
}

fn consume<W: Write>(
    pair: &DevicePair,
    chunk: usize,
    mut sink: W,
    producer_done: &AtomicBool,
) -> Result<usize, CliError> {
    let output = pair.output().open();
    let mut buf = vec![0u8; chunk];
    let mut total = 0;

    loop {
        let finished = producer_done.load(Ordering::Acquire);
        let n = output.drain(&mut buf)?;
        if n > 0 {
            sink.write_all(&buf[..n])?;
            total += n;
        } else if finished {
            break;
        } else {
            thread::yield_now();
        }
    }

    sink.flush()?;
    Ok(total)
}
