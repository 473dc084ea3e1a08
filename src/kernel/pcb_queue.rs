use std::collections::VecDeque;

use thiserror::Error;

use super::PcbHandle;

/// Maximum number of processes a queue will hold by default.
pub const MAX_PROCESSES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("PCB queue is full")]
    Full,

    #[error("PCB queue is empty")]
    Empty,
}

/// Bounded FIFO of PCB handles. Enqueue appends at the tail, dequeue removes
/// from the head; both report capacity violations as checked errors.
pub struct PcbQueue {
    entries: VecDeque<PcbHandle>,
    capacity: usize,
}

impl PcbQueue {
    pub fn new() -> PcbQueue {
        PcbQueue::with_capacity(MAX_PROCESSES)
    }

    pub fn with_capacity(capacity: usize) -> PcbQueue {
        PcbQueue {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn enqueue(&mut self, process: PcbHandle) -> Result<(), QueueError> {
        if self.entries.len() == self.capacity {
            return Err(QueueError::Full);
        }

        self.entries.push_back(process);
        Ok(())
    }

    pub fn dequeue(&mut self) -> Result<PcbHandle, QueueError> {
        self.entries.pop_front().ok_or(QueueError::Empty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PcbQueue {
    fn default() -> PcbQueue {
        PcbQueue::new()
    }
}
