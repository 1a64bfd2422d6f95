//! Execution layer: pipes, fork/exec, transfer and result assembly
//!
//! A run goes through four stages, leaves first:
//!
//! - **pipes**: allocate the input, output and error pipes
//! - **spawn**: fork, rewire the child's standard streams, exec
//! - **orchestrator**: feed stdin, drain stdout and stderr
//! - **result**: map the outcome onto [`Output`] or a [`Pipe3Error`]
//!
//! [`Pipe3Error`]: pipe3_core::Pipe3Error

pub mod orchestrator;
pub mod pipes;
pub mod result;
pub mod spawn;

pub use pipes::{ChildEnds, ParentEnds, Pipe, PipeRole, PipeTriad};
pub use result::{Output, into_bytes};
pub use spawn::{ChildProcess, ChildStart, ExitStatus, START_FAILURE_EXIT};
