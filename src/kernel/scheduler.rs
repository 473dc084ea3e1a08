use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use super::{Consumer, HandoffSlot, PcbHandle, ProcessKind, Producer, RoleError, StepOutcome};
use crate::kernel::SemaphoreError;
use crate::{KernelError, KernelResult};

/// How the two roles are driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One coordinating loop performs a full producer step, then a full
    /// consumer step, per iteration (round-robin emulation).
    Coordinated,
    /// Producer and consumer run on independent host threads; the semaphore
    /// protocol alone enforces alternation.
    Concurrent,
}

#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    pub mode: ExecutionMode,
    /// Pause between coordinated steps, during which the stepped PCB is held
    /// in `Delayed`. Zero disables the pause.
    pub time_slice: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> SchedulerConfig {
        SchedulerConfig {
            mode: ExecutionMode::Concurrent,
            time_slice: Duration::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    pub bytes_produced: usize,
    pub bytes_consumed: usize,
}

/// Drives the producer/consumer pipeline to termination over a source and a
/// sink, per the configured execution mode.
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Scheduler {
        Scheduler { config }
    }

    pub fn run<R, W>(&self, source: &mut R, sink: &mut W) -> KernelResult<PipelineReport>
    where
        R: Read + Send,
        W: Write + Send,
    {
        info!(mode = ?self.config.mode, "starting pipeline");

        let report = match self.config.mode {
            ExecutionMode::Coordinated => self.run_coordinated(source, sink),
            ExecutionMode::Concurrent => self.run_concurrent(source, sink),
        }?;

        info!(
            bytes_produced = report.bytes_produced,
            bytes_consumed = report.bytes_consumed,
            "pipeline terminated"
        );
        Ok(report)
    }

    fn role_kind(&self) -> ProcessKind {
        if self.config.time_slice.is_zero() {
            ProcessKind::RealTime
        } else {
            ProcessKind::TimeSliced
        }
    }

    fn run_coordinated<R, W>(&self, source: &mut R, sink: &mut W) -> KernelResult<PipelineReport>
    where
        R: Read,
        W: Write,
    {
        let slot = HandoffSlot::new()?;
        let mut producer = Producer::new(self.role_kind());
        let mut consumer = Consumer::new(self.role_kind());
        let mut producer_done = false;

        loop {
            if !producer_done {
                producer.pcb().lock().unwrap().dispatch();
                let outcome = producer
                    .step(&slot, source)
                    .map_err(KernelError::Producer)?;
                producer.pcb().lock().unwrap().make_ready();

                if outcome == StepOutcome::Terminated {
                    debug!("producer slice terminated");
                    producer_done = true;
                } else {
                    self.pause(producer.pcb());
                }
            }

            consumer.pcb().lock().unwrap().dispatch();
            let outcome = consumer.step(&slot, sink).map_err(KernelError::Consumer)?;
            consumer.pcb().lock().unwrap().make_ready();

            if outcome == StepOutcome::Terminated {
                break;
            }
            self.pause(consumer.pcb());
        }

        Ok(PipelineReport {
            bytes_produced: producer.bytes_produced(),
            bytes_consumed: consumer.bytes_consumed(),
        })
    }

    fn run_concurrent<R, W>(&self, source: &mut R, sink: &mut W) -> KernelResult<PipelineReport>
    where
        R: Read + Send,
        W: Write + Send,
    {
        let slot = HandoffSlot::new()?;
        let mut producer = Producer::new(self.role_kind());
        let mut consumer = Consumer::new(self.role_kind());

        let (produced, consumed) = {
            let slot = &slot;
            thread::scope(|s| {
                let producer_thread = s.spawn(move || producer.run(slot, source));
                let consumer_thread = s.spawn(move || consumer.run(slot, sink));

                (
                    producer_thread.join().expect("producer thread panicked"),
                    consumer_thread.join().expect("consumer thread panicked"),
                )
            })
        };

        Scheduler::reconcile(produced, consumed)
    }

    /// Holds the stepped PCB in `Delayed` for one time slice.
    fn pause(&self, pcb: &PcbHandle) {
        if self.config.time_slice.is_zero() {
            return;
        }

        pcb.lock().unwrap().delay();
        thread::sleep(self.config.time_slice);
        pcb.lock().unwrap().make_ready();
    }

    /// Folds the two role results into one. A role stranded by its partner's
    /// abort reports `Aborted`; the originating stream error wins.
    fn reconcile(
        produced: Result<usize, RoleError>,
        consumed: Result<usize, RoleError>,
    ) -> KernelResult<PipelineReport> {
        fn is_abort(err: &RoleError) -> bool {
            matches!(err, RoleError::Sync(SemaphoreError::Aborted))
        }

        match (produced, consumed) {
            (Ok(bytes_produced), Ok(bytes_consumed)) => Ok(PipelineReport {
                bytes_produced,
                bytes_consumed,
            }),
            (Err(err), Ok(_)) => Err(KernelError::Producer(err)),
            (Ok(_), Err(err)) => Err(KernelError::Consumer(err)),
            (Err(producer_err), Err(consumer_err)) => {
                if is_abort(&producer_err) && !is_abort(&consumer_err) {
                    Err(KernelError::Consumer(consumer_err))
                } else {
                    Err(KernelError::Producer(producer_err))
                }
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Scheduler {
        Scheduler::new(SchedulerConfig::default())
    }
}
