//! Minimal real-time kernel core.
//!
//! Serializes a producer and a consumer process through a single-slot
//! handoff buffer, gated by a pair of counting semaphores, to copy a byte
//! stream from a source to a sink without reordering, duplication, or loss.
//!
//! ## Modules
//! - `kernel` - PCBs, the PCB queue, the semaphore primitive, the handoff
//!   slot, the two roles, and the scheduler
//! - `io` - source/sink stream collaborators

pub mod io;
pub mod kernel;

use thiserror::Error;

use kernel::{RoleError, SemaphoreError};

pub type KernelResult<T> = Result<T, KernelError>;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("semaphore error: {0}")]
    Semaphore(#[from] SemaphoreError),

    #[error("stream error: {0}")]
    Stream(#[from] io::StreamError),

    #[error("producer failed: {0}")]
    Producer(RoleError),

    #[error("consumer failed: {0}")]
    Consumer(RoleError),
}
