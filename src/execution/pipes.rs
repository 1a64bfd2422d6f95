//! Pipe triad: the three channels between parent and child
//!
//! Every end is an [`OwnedFd`], so whichever path drops a pipe closes it.
//! All six descriptors are close-on-exec and numbered above the standard
//! streams, which keeps the child's `dup2` rewiring free of collisions and
//! keeps sibling children forked by other threads from holding our ends.

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use pipe3_core::{Pipe3Error, Result};
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};

/// Role of a pipe, from the parent's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeRole {
    /// Parent writes, child reads (child's stdin)
    Input,
    /// Child writes, parent reads (child's stdout)
    Output,
    /// Child writes, parent reads (child's stderr)
    Error,
}

impl PipeRole {
    fn allocation_error(self, errno: Errno) -> Pipe3Error {
        match self {
            PipeRole::Input => Pipe3Error::StdinPipe(errno),
            PipeRole::Output => Pipe3Error::StdoutPipe(errno),
            PipeRole::Error => Pipe3Error::StderrPipe(errno),
        }
    }
}

/// One unidirectional channel
#[derive(Debug)]
pub struct Pipe {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

/// Input, output and error pipes, allocated in that order
#[derive(Debug)]
pub struct PipeTriad {
    pub input: Pipe,
    pub output: Pipe,
    pub error: Pipe,
}

/// The ends the parent keeps after the split
#[derive(Debug)]
pub struct ParentEnds {
    pub stdin: OwnedFd,
    pub stdout: OwnedFd,
    pub stderr: OwnedFd,
}

/// The ends the child rewires onto fds 0, 1 and 2
#[derive(Debug)]
pub struct ChildEnds {
    pub stdin: OwnedFd,
    pub stdout: OwnedFd,
    pub stderr: OwnedFd,
}

/// Raw view of all six descriptors, for the child side of `fork`
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawTriad {
    pub child_stdin: RawFd,
    pub child_stdout: RawFd,
    pub child_stderr: RawFd,
    pub parent_stdin: RawFd,
    pub parent_stdout: RawFd,
    pub parent_stderr: RawFd,
}

impl RawTriad {
    pub(crate) fn all(&self) -> [RawFd; 6] {
        [
            self.child_stdin,
            self.child_stdout,
            self.child_stderr,
            self.parent_stdin,
            self.parent_stdout,
            self.parent_stderr,
        ]
    }
}

impl PipeTriad {
    /// Allocate the triad with `pipe2(O_CLOEXEC)`.
    ///
    /// On failure, pipes already allocated are closed and the error names the
    /// pipe that could not be created.
    pub fn allocate() -> Result<Self> {
        Self::allocate_with(|_| pipe2(OFlag::O_CLOEXEC))
    }

    /// Allocate with a custom pipe factory, called once per role in the order
    /// input, output, error.
    pub fn allocate_with<F>(mut make: F) -> Result<Self>
    where
        F: FnMut(PipeRole) -> nix::Result<(OwnedFd, OwnedFd)>,
    {
        let mut open = |role: PipeRole| -> Result<Pipe> {
            let (read, write) = make(role).map_err(|errno| role.allocation_error(errno))?;
            let read = above_stdio(read).map_err(|errno| role.allocation_error(errno))?;
            let write = above_stdio(write).map_err(|errno| role.allocation_error(errno))?;
            Ok(Pipe { read, write })
        };

        let input = open(PipeRole::Input)?;
        let output = open(PipeRole::Output)?;
        let error = open(PipeRole::Error)?;

        Ok(Self {
            input,
            output,
            error,
        })
    }

    pub(crate) fn raw(&self) -> RawTriad {
        RawTriad {
            child_stdin: self.input.read.as_raw_fd(),
            child_stdout: self.output.write.as_raw_fd(),
            child_stderr: self.error.write.as_raw_fd(),
            parent_stdin: self.input.write.as_raw_fd(),
            parent_stdout: self.output.read.as_raw_fd(),
            parent_stderr: self.error.read.as_raw_fd(),
        }
    }

    /// Split into the parent's and the child's ends.
    pub fn split(self) -> (ParentEnds, ChildEnds) {
        let parent = ParentEnds {
            stdin: self.input.write,
            stdout: self.output.read,
            stderr: self.error.read,
        };
        let child = ChildEnds {
            stdin: self.input.read,
            stdout: self.output.write,
            stderr: self.error.write,
        };
        (parent, child)
    }
}

/// Move a descriptor that landed on 0, 1 or 2 (possible when the caller has
/// closed its own standard streams) to the lowest free number above them.
fn above_stdio(fd: OwnedFd) -> nix::Result<OwnedFd> {
    let raw = fd.as_raw_fd();
    if raw > libc::STDERR_FILENO {
        return Ok(fd);
    }

    let moved = unsafe { libc::fcntl(raw, libc::F_DUPFD_CLOEXEC, libc::STDERR_FILENO + 1) };
    if moved < 0 {
        return Err(Errno::last());
    }
    // `fd` is dropped here, freeing the low slot.
    Ok(unsafe { OwnedFd::from_raw_fd(moved) })
}
