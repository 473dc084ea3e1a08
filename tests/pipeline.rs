//! End-to-end pipeline tests: copy fidelity, clean termination, and the
//! abort path that keeps a failed role from stranding its partner.

use std::io::{Cursor, ErrorKind, Read, Write};
use std::time::Duration;

use proptest::prelude::*;

use rtkernel::kernel::{ExecutionMode, Scheduler, SchedulerConfig};
use rtkernel::KernelError;

fn coordinated() -> SchedulerConfig {
    SchedulerConfig {
        mode: ExecutionMode::Coordinated,
        time_slice: Duration::ZERO,
    }
}

fn copy(config: SchedulerConfig, input: &[u8]) -> Vec<u8> {
    let mut source = Cursor::new(input.to_vec());
    let mut sink = Vec::new();

    Scheduler::new(config)
        .run(&mut source, &mut sink)
        .expect("pipeline must succeed");
    sink
}

#[test]
fn copies_ab_concurrent() {
    assert_eq!(copy(SchedulerConfig::default(), b"AB"), b"AB");
}

#[test]
fn copies_ab_coordinated() {
    assert_eq!(copy(coordinated(), b"AB"), b"AB");
}

#[test]
fn empty_input_terminates_both_modes() {
    assert!(copy(SchedulerConfig::default(), b"").is_empty());
    assert!(copy(coordinated(), b"").is_empty());
}

#[test]
fn report_counts_match_input_length() {
    let input = vec![0xA5u8; 300];
    let mut source = Cursor::new(input.clone());
    let mut sink = Vec::new();

    let report = Scheduler::new(SchedulerConfig::default())
        .run(&mut source, &mut sink)
        .unwrap();

    assert_eq!(report.bytes_produced, input.len());
    assert_eq!(report.bytes_consumed, input.len());
    assert_eq!(sink, input);
}

/// Source that yields some bytes, then fails.
struct BrokenSource {
    remaining: usize,
}

impl Read for BrokenSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.remaining == 0 {
            return Err(std::io::Error::new(ErrorKind::Other, "read failed"));
        }
        self.remaining -= 1;
        buf[0] = b'z';
        Ok(1)
    }
}

/// Sink that accepts some bytes, then fails.
struct BrokenSink {
    accepted: Vec<u8>,
    capacity: usize,
}

impl Write for BrokenSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.accepted.len() == self.capacity {
            return Err(std::io::Error::new(ErrorKind::Other, "write failed"));
        }
        self.accepted.extend_from_slice(&buf[..1]);
        Ok(1)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn failing_source_does_not_hang_consumer() {
    let mut source = BrokenSource { remaining: 3 };
    let mut sink = Vec::new();

    let result = Scheduler::new(SchedulerConfig::default()).run(&mut source, &mut sink);

    assert!(matches!(result, Err(KernelError::Producer(_))));
    // Whatever made it across before the failure is still in order.
    assert!(sink.iter().all(|&b| b == b'z'));
}

#[test]
fn failing_sink_does_not_hang_producer() {
    let input = vec![1u8; 64];
    let mut source = Cursor::new(input);
    let mut sink = BrokenSink {
        accepted: Vec::new(),
        capacity: 5,
    };

    let result = Scheduler::new(SchedulerConfig::default()).run(&mut source, &mut sink);

    assert!(matches!(result, Err(KernelError::Consumer(_))));
    assert_eq!(sink.accepted.len(), 5);
}

#[test]
fn failing_sink_coordinated_propagates_error() {
    let mut source = Cursor::new(vec![1u8; 8]);
    let mut sink = BrokenSink {
        accepted: Vec::new(),
        capacity: 2,
    };

    let result = Scheduler::new(coordinated()).run(&mut source, &mut sink);

    assert!(matches!(result, Err(KernelError::Consumer(_))));
}

proptest! {
    #[test]
    fn copies_arbitrary_input_concurrent(input in proptest::collection::vec(any::<u8>(), 0..2048)) {
        prop_assert_eq!(copy(SchedulerConfig::default(), &input), input);
    }

    #[test]
    fn copies_arbitrary_input_coordinated(input in proptest::collection::vec(any::<u8>(), 0..512)) {
        prop_assert_eq!(copy(coordinated(), &input), input);
    }
}
