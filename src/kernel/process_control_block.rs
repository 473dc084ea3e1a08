use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Maximum length of a process name; longer names are truncated.
pub const MAX_NAME_LENGTH: usize = 20;

static NEXT_PROCESS_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    Blocked,
    Delayed,
}

/// Informational scheduling class; does not alter policy in the two-role
/// pipeline but is part of the process identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessKind {
    RealTime,
    TimeSliced,
}

/// Shared handle to a PCB. The semaphore wait queue and the scheduler hold
/// clones of this handle; the queue never owns the sole reference.
pub type PcbHandle = Arc<Mutex<ProcessControlBlock>>;

pub struct ProcessControlBlock {
    id: u32,
    name: String,
    kind: ProcessKind,
    state: ProcessState,
}

impl ProcessControlBlock {
    pub fn new(name: &str, kind: ProcessKind) -> ProcessControlBlock {
        let mut name = name.to_string();
        let mut end = MAX_NAME_LENGTH.min(name.len());
        // Back off to a char boundary so a multi-byte name cannot panic.
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);

        ProcessControlBlock {
            id: NEXT_PROCESS_ID.fetch_add(1, Ordering::Relaxed),
            name,
            kind,
            state: ProcessState::Ready,
        }
    }

    pub fn new_handle(name: &str, kind: ProcessKind) -> PcbHandle {
        Arc::new(Mutex::new(ProcessControlBlock::new(name, kind)))
    }

    pub fn get_id(&self) -> u32 {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_kind(&self) -> ProcessKind {
        self.kind
    }

    pub fn get_state(&self) -> ProcessState {
        self.state
    }

    pub fn make_ready(&mut self) {
        self.state = ProcessState::Ready;
    }

    pub fn block(&mut self) {
        self.state = ProcessState::Blocked;
    }

    pub fn dispatch(&mut self) {
        self.state = ProcessState::Running;
    }

    pub fn delay(&mut self) {
        self.state = ProcessState::Delayed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcb_new_starts_ready_with_monotonic_ids() {
        let first = ProcessControlBlock::new("Producer", ProcessKind::RealTime);
        let second = ProcessControlBlock::new("Consumer", ProcessKind::RealTime);

        assert!(first.get_id() < second.get_id());
        assert_eq!(first.get_state(), ProcessState::Ready);
        assert_eq!(second.get_state(), ProcessState::Ready);
    }

    #[test]
    fn test_pcb_new_truncates_long_name() {
        let pcb = ProcessControlBlock::new(
            "a-process-name-well-beyond-the-limit",
            ProcessKind::TimeSliced,
        );

        assert_eq!(pcb.get_name().len(), MAX_NAME_LENGTH);
        assert_eq!(pcb.get_kind(), ProcessKind::TimeSliced);
    }

    #[test]
    fn test_pcb_new_truncates_multibyte_name_on_char_boundary() {
        // Byte 20 falls inside the two-byte 'é'; truncation must back off
        // to the previous boundary instead of panicking.
        let pcb = ProcessControlBlock::new("0123456789012345678é", ProcessKind::RealTime);

        assert_eq!(pcb.get_name(), "0123456789012345678");
        assert!(pcb.get_name().len() <= MAX_NAME_LENGTH);
    }

    #[test]
    fn test_pcb_state_transitions() {
        let mut pcb = ProcessControlBlock::new("Producer", ProcessKind::RealTime);

        pcb.dispatch();
        assert_eq!(pcb.get_state(), ProcessState::Running);

        pcb.block();
        assert_eq!(pcb.get_state(), ProcessState::Blocked);

        pcb.make_ready();
        assert_eq!(pcb.get_state(), ProcessState::Ready);

        pcb.delay();
        assert_eq!(pcb.get_state(), ProcessState::Delayed);
    }
}
