use std::io::{ErrorKind, Read, Write};

use thiserror::Error;
use tracing::{debug, warn};

use super::{HandoffSlot, Item, PcbHandle, ProcessControlBlock, ProcessKind, SemaphoreError};
use crate::io::StreamError;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("stream failure: {0}")]
    Stream(#[from] StreamError),

    #[error("synchronization failure: {0}")]
    Sync(#[from] SemaphoreError),
}

/// Outcome of a single semaphore-gated role step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Transferred,
    Terminated,
}

/// Reads the source one byte at a time and hands each byte to the consumer
/// through the slot; delivers the sentinel exactly once on exhaustion.
pub struct Producer {
    pcb: PcbHandle,
    bytes_produced: usize,
}

impl Producer {
    pub fn new(kind: ProcessKind) -> Producer {
        Producer {
            pcb: ProcessControlBlock::new_handle("Producer", kind),
            bytes_produced: 0,
        }
    }

    pub fn pcb(&self) -> &PcbHandle {
        &self.pcb
    }

    pub fn bytes_produced(&self) -> usize {
        self.bytes_produced
    }

    /// One producer step: read a unit from the source, then put it into the
    /// slot. On a read error the slot is aborted so the consumer is never
    /// left blocked on `slot_full`.
    pub fn step<R: Read>(
        &mut self,
        slot: &HandoffSlot,
        source: &mut R,
    ) -> Result<StepOutcome, RoleError> {
        let mut buf = [0u8; 1];

        let read = loop {
            match source.read(&mut buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("producer read failed, aborting pipeline: {err}");
                    slot.abort();
                    return Err(StreamError::Read(err).into());
                }
            }
        };

        if read == 0 {
            slot.put(&self.pcb, Item::EndOfStream)?;
            debug!(
                bytes = self.bytes_produced,
                "producer delivered end-of-stream"
            );
            return Ok(StepOutcome::Terminated);
        }

        slot.put(&self.pcb, Item::Byte(buf[0]))?;
        self.bytes_produced += 1;
        Ok(StepOutcome::Transferred)
    }

    pub fn run<R: Read>(&mut self, slot: &HandoffSlot, source: &mut R) -> Result<usize, RoleError> {
        self.pcb.lock().unwrap().dispatch();

        let result = loop {
            match self.step(slot, source) {
                Ok(StepOutcome::Transferred) => continue,
                Ok(StepOutcome::Terminated) => break Ok(self.bytes_produced),
                Err(err) => break Err(err),
            }
        };

        self.pcb.lock().unwrap().make_ready();
        result
    }
}

/// Drains the slot into the sink until the sentinel arrives.
pub struct Consumer {
    pcb: PcbHandle,
    bytes_consumed: usize,
}

impl Consumer {
    pub fn new(kind: ProcessKind) -> Consumer {
        Consumer {
            pcb: ProcessControlBlock::new_handle("Consumer", kind),
            bytes_consumed: 0,
        }
    }

    pub fn pcb(&self) -> &PcbHandle {
        &self.pcb
    }

    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// One consumer step: take from the slot; on a byte, write it to the
    /// sink and only then return the slot to the producer. On a write or
    /// flush error the slot is aborted so the producer is never left
    /// blocked on `slot_empty`.
    pub fn step<W: Write>(
        &mut self,
        slot: &HandoffSlot,
        sink: &mut W,
    ) -> Result<StepOutcome, RoleError> {
        match slot.take(&self.pcb)? {
            Item::EndOfStream => {
                if let Err(err) = sink.flush() {
                    warn!("consumer flush failed, aborting pipeline: {err}");
                    slot.abort();
                    return Err(StreamError::Flush(err).into());
                }
                debug!(bytes = self.bytes_consumed, "consumer saw end-of-stream");
                Ok(StepOutcome::Terminated)
            }
            Item::Byte(byte) => {
                if let Err(err) = sink.write_all(&[byte]) {
                    warn!("consumer write failed, aborting pipeline: {err}");
                    slot.abort();
                    return Err(StreamError::Write(err).into());
                }
                self.bytes_consumed += 1;
                slot.release();
                Ok(StepOutcome::Transferred)
            }
        }
    }

    pub fn run<W: Write>(&mut self, slot: &HandoffSlot, sink: &mut W) -> Result<usize, RoleError> {
        self.pcb.lock().unwrap().dispatch();

        let result = loop {
            match self.step(slot, sink) {
                Ok(StepOutcome::Transferred) => continue,
                Ok(StepOutcome::Terminated) => break Ok(self.bytes_consumed),
                Err(err) => break Err(err),
            }
        };

        self.pcb.lock().unwrap().make_ready();
        result
    }
}
