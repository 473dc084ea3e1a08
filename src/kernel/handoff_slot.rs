use std::sync::Mutex;

use super::{PcbHandle, Semaphore, SemaphoreError, MAX_PROCESSES};

/// One unit of data moving through the pipeline. `EndOfStream` is the
/// sentinel the producer delivers exactly once when its source is exhausted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Item {
    Byte(u8),
    EndOfStream,
}

/// Capacity-1 handoff channel between the producer and consumer roles.
///
/// The cell is gated by the classic semaphore pair: `slot_empty` (initially
/// 1) grants the right to write, `slot_full` (initially 0) the right to
/// read. The counting protocol alone guarantees the cell is never written
/// twice before being read and never read twice before being rewritten; the
/// cell mutex only protects the store/load itself.
pub struct HandoffSlot {
    cell: Mutex<Option<Item>>,
    slot_empty: Semaphore,
    slot_full: Semaphore,
}

impl HandoffSlot {
    pub fn new() -> Result<HandoffSlot, SemaphoreError> {
        Ok(HandoffSlot {
            cell: Mutex::new(None),
            slot_empty: Semaphore::with_capacity(1, MAX_PROCESSES)?,
            slot_full: Semaphore::with_capacity(0, MAX_PROCESSES)?,
        })
    }

    /// Producer side: acquire the empty slot, store the item, and hand the
    /// full slot to the consumer.
    pub fn put(&self, caller: &PcbHandle, item: Item) -> Result<(), SemaphoreError> {
        self.slot_empty.wait(caller)?;
        *self.cell.lock().unwrap() = Some(item);
        self.slot_full.signal();
        Ok(())
    }

    /// Consumer side: acquire the full slot and remove the item. The caller
    /// must follow up with [`release`](Self::release) once the item has been
    /// disposed of, except after `EndOfStream`, which is terminal.
    pub fn take(&self, caller: &PcbHandle) -> Result<Item, SemaphoreError> {
        self.slot_full.wait(caller)?;

        let item = self.cell.lock().unwrap().take();
        // A granted slot_full with an empty cell means the counting protocol
        // was violated; that is a logic defect, not a runtime condition.
        Ok(item.expect("slot_full granted on an empty cell"))
    }

    /// Returns the (now consumed) slot to the producer.
    pub fn release(&self) {
        self.slot_empty.signal();
    }

    /// Unblocks whichever role is waiting on either semaphore and fails all
    /// future puts and takes. Called by a role that hit a stream error so
    /// its partner cannot deadlock.
    pub fn abort(&self) {
        self.slot_empty.abort();
        self.slot_full.abort();
    }
}
