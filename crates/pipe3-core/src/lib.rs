//! pipe3-core: shared types, errors, and small helpers for pipe3
//!
//! This crate provides the pieces used by the executor and its front ends:
//! - Error types and Result alias
//! - Exit status and captured output
//! - Descriptor accounting
//! - Fixed-width hex/ASCII line formatting
//! - Recursive directory creation

pub mod error;
pub mod fs;
pub mod hex;
pub mod status;
pub mod util;

pub use error::{ErrorKind, Pipe3Error, Result, Stream};
pub use fs::full_mkdir;
pub use hex::{HexDump, hex_line, hex_line_at};
pub use status::{Captured, ExitStatus};
