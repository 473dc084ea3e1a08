use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

use thiserror::Error;
use tracing::trace;

use super::{PcbHandle, PcbQueue, QueueError, MAX_PROCESSES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SemaphoreError {
    #[error("failed to initialize semaphore wait queue")]
    Init,

    #[error("semaphore wait aborted")]
    Aborted,

    #[error("semaphore wait queue misuse: {0}")]
    Queue(#[from] QueueError),
}

/// Counting semaphore with a FIFO wait queue of PCB handles.
///
/// `value` and the wait queue are mutated only under the internal mutex.
/// Invariant at every lock release (abort aside):
/// `wait_queue.len() == max(0, -value)`.
pub struct Semaphore {
    state: Mutex<SemaphoreState>,
    wakeups: Condvar,
}

struct SemaphoreState {
    value: i32,
    wait_queue: PcbQueue,
    // Ids of PCBs a signal has dequeued and made ready. Condvar wakeups are
    // unordered, so each waiter sleeps until its own id shows up here; that
    // is what makes the wake order match the queue order.
    released: HashSet<u32>,
    aborted: bool,
}

impl Semaphore {
    pub fn new(initial_value: i32) -> Semaphore {
        // MAX_PROCESSES is non-zero, so this cannot fail.
        Semaphore::with_capacity(initial_value, MAX_PROCESSES).unwrap()
    }

    pub fn with_capacity(
        initial_value: i32,
        max_waiters: usize,
    ) -> Result<Semaphore, SemaphoreError> {
        if max_waiters == 0 {
            return Err(SemaphoreError::Init);
        }

        Ok(Semaphore {
            state: Mutex::new(SemaphoreState {
                value: initial_value,
                wait_queue: PcbQueue::with_capacity(max_waiters),
                released: HashSet::new(),
                aborted: false,
            }),
            wakeups: Condvar::new(),
        })
    }

    /// Decrements the count. When the result goes negative, blocks the
    /// caller's own PCB, enqueues it, and suspends until a `signal` releases
    /// this specific PCB or the semaphore is aborted.
    pub fn wait(&self, caller: &PcbHandle) -> Result<(), SemaphoreError> {
        let mut state = self.state.lock().unwrap();

        if state.aborted {
            return Err(SemaphoreError::Aborted);
        }

        state.value -= 1;
        if state.value >= 0 {
            return Ok(());
        }

        let caller_id = {
            let mut pcb = caller.lock().unwrap();
            pcb.block();
            pcb.get_id()
        };
        if let Err(err) = state.wait_queue.enqueue(caller.clone()) {
            // Undo the decrement and the Blocked transition: a refused wait
            // must leave the count and the queue consistent, and a PCB is
            // Blocked only while it sits on a wait queue.
            state.value += 1;
            caller.lock().unwrap().make_ready();
            return Err(err.into());
        }
        trace!(pcb = caller_id, value = state.value, "blocked on semaphore");

        loop {
            if state.released.remove(&caller_id) {
                break;
            }
            if state.aborted {
                return Err(SemaphoreError::Aborted);
            }
            state = self.wakeups.wait(state).unwrap();
        }
        drop(state);

        // Released by a signal; resume execution.
        caller.lock().unwrap().dispatch();
        Ok(())
    }

    /// Increments the count and wakes the head waiter, if any, in FIFO
    /// order. A signal with no waiter is a no-op wake.
    pub fn signal(&self) {
        let mut state = self.state.lock().unwrap();

        state.value += 1;
        if state.value > 0 || state.wait_queue.is_empty() {
            return;
        }

        if let Ok(process) = state.wait_queue.dequeue() {
            let id = {
                let mut pcb = process.lock().unwrap();
                pcb.make_ready();
                pcb.get_id()
            };
            state.released.insert(id);
            trace!(pcb = id, value = state.value, "released from semaphore");
            self.wakeups.notify_all();
        }
    }

    /// Poison path: wakes every blocked waiter with `Aborted` and fails all
    /// future waits. Used when a role dies so its partner never hangs.
    pub fn abort(&self) {
        let mut state = self.state.lock().unwrap();

        state.aborted = true;
        while let Ok(process) = state.wait_queue.dequeue() {
            process.lock().unwrap().make_ready();
        }
        state.value = 0;
        self.wakeups.notify_all();
    }

    pub fn value(&self) -> i32 {
        self.state.lock().unwrap().value
    }

    pub fn waiting(&self) -> usize {
        self.state.lock().unwrap().wait_queue.len()
    }
}
