//! Executor configuration

use pipe3_core::{Pipe3Error, Result};

/// Default read size for draining the child's output
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Largest accepted read size
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// How the parent moves bytes through the triad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainMode {
    /// Feed stdin and drain stdout and stderr at the same time, each on its
    /// own thread. Cannot deadlock on full pipe buffers.
    #[default]
    Concurrent,
    /// Write all of stdin and close it, then drain stdout to the end, then
    /// stderr. Hangs if the child fills one pipe buffer while the parent is
    /// blocked on another.
    Sequential,
}

/// Execution configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecConfig {
    /// Drain strategy
    pub drain: DrainMode,
    /// Bytes requested per read from the output pipes
    pub chunk_size: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            drain: DrainMode::Concurrent,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ExecConfig {
    /// Configuration with the write-then-drain ordering
    pub fn sequential() -> Self {
        Self {
            drain: DrainMode::Sequential,
            ..Default::default()
        }
    }

    pub fn drain(mut self, drain: DrainMode) -> Self {
        self.drain = drain;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Pipe3Error::InvalidConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Pipe3Error::InvalidConfig(format!(
                "chunk size {} exceeds the maximum of {} bytes",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        Ok(())
    }
}
