use charbuf::{DeviceConfig, DevicePair, NoopObserver, BUFFER_LENGTH};
use cli::{pump, CliError};
use std::io::{self, Read, Write};
use std::sync::Arc;

fn quiet_pair() -> DevicePair {
    DevicePair::with_observer(DeviceConfig::default(), Arc::new(NoopObserver))
}

/// Sink that fails on the first write
struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source that panics on the first read
struct PanickingSource;

impl Read for PanickingSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        panic!("source exploded");
    }
}

/// Sink that panics on the first write
struct PanickingSink;

impl Write for PanickingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        panic!("sink exploded");
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_pump_copies_everything_in_order() {
    let pair = quiet_pair();
    let source: Vec<u8> = (0..50_000u32).map(|i| (i % 241) as u8).collect();
    let mut sink = Vec::new();

    let stats = pump(&pair, 64, source.as_slice(), &mut sink).unwrap();

    assert_eq!(sink, source);
    assert_eq!(stats.bytes_in, source.len());
    assert_eq!(stats.bytes_out, source.len());
    assert!(pair.buffer().is_empty());
}

#[test]
fn test_pump_chunk_larger_than_buffer() {
    let pair = quiet_pair();
    let source = vec![b'z'; 10 * BUFFER_LENGTH];
    let mut sink = Vec::new();

    let stats = pump(&pair, 4 * BUFFER_LENGTH, source.as_slice(), &mut sink).unwrap();

    assert_eq!(sink, source);
    assert_eq!(stats.bytes_out, source.len());
}

#[test]
fn test_pump_closes_endpoints() {
    let pair = quiet_pair();
    pump(&pair, 16, &b"hello"[..], io::sink()).unwrap();

    assert_eq!(pair.input().lifecycle().open_count(), 1);
    assert_eq!(pair.input().lifecycle().live_handles(), 0);
    assert_eq!(pair.output().lifecycle().live_handles(), 0);
}

#[test]
fn test_broken_sink_stops_producer() {
    let pair = quiet_pair();
    let source = vec![0u8; 100 * BUFFER_LENGTH];

    let result = pump(&pair, 128, source.as_slice(), BrokenSink);

    match result {
        Err(CliError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected IO error, got {other:?}"),
    }
}

#[test]
fn test_source_panic_is_reported() {
    let pair = quiet_pair();

    let result = pump(&pair, 16, PanickingSource, io::sink());

    assert!(matches!(result, Err(CliError::Panicked("producer"))));
    assert_eq!(pair.output().lifecycle().live_handles(), 0);
}

#[test]
fn test_sink_panic_is_reported() {
    let pair = quiet_pair();
    let source = vec![1u8; 100 * BUFFER_LENGTH];

    let result = pump(&pair, 128, source.as_slice(), PanickingSink);

    assert!(matches!(result, Err(CliError::Panicked("consumer"))));
    assert_eq!(pair.input().lifecycle().live_handles(), 0);
}
