mod handoff_slot;
mod pcb_queue;
mod process_control_block;
mod roles;
mod scheduler;
mod semaphore;

pub use handoff_slot::{HandoffSlot, Item};
pub use pcb_queue::{PcbQueue, QueueError, MAX_PROCESSES};
pub use process_control_block::{
    PcbHandle, ProcessControlBlock, ProcessKind, ProcessState, MAX_NAME_LENGTH,
};
pub use roles::{Consumer, Producer, RoleError, StepOutcome};
pub use scheduler::{ExecutionMode, PipelineReport, Scheduler, SchedulerConfig};
pub use semaphore::{Semaphore, SemaphoreError};
