//! Error types for pipe3 operations

use crate::status::Captured;
use nix::errno::Errno;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipe3 operations
pub type Result<T> = std::result::Result<T, Pipe3Error>;

/// Which captured stream an I/O failure happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => f.write_str("stdout"),
            Stream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Coarse classification of a [`Pipe3Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request, rejected before any OS resource is touched
    Request,
    /// Pipe, argument or process creation failed; nothing was spawned
    Setup,
    /// The input payload could not be delivered to the child
    Transfer,
    /// The child could not load the target program
    ChildStart,
    /// Reading the child's output or reaping it failed
    Io,
    /// Invalid executor or helper configuration
    Config,
}

/// Errors that can occur while running a child or using the helpers
#[derive(Error, Debug)]
pub enum Pipe3Error {
    #[error("expecting table of command arguments as first argument")]
    InvalidRequest,

    #[error("error allocating child's command arguments")]
    ArgumentAllocation,

    #[error("error creating parent write pipe")]
    StdinPipe(#[source] Errno),

    #[error("error creating parent read pipe")]
    StdoutPipe(#[source] Errno),

    #[error("error creating parent read error pipe")]
    StderrPipe(#[source] Errno),

    #[error("error forking process")]
    Fork(#[source] Errno),

    /// `captured` holds whatever the child wrote before it stopped reading.
    #[error("error writing to child's stdin")]
    WriteStdin {
        #[source]
        source: io::Error,
        captured: Box<Captured>,
    },

    /// The child reported that it never reached the target program.
    /// `reason` is the diagnostic the child wrote, e.g. `error calling /bin/nope`.
    #[error("{reason}")]
    ChildStart { reason: String, errno: Option<i32> },

    #[error("error reading child's {stream}")]
    Read {
        stream: Stream,
        #[source]
        source: io::Error,
        captured: Box<Captured>,
    },

    #[error("error waiting for child process")]
    Wait(#[source] Errno),

    #[error("error starting stream worker thread")]
    ThreadSpawn(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("error creating directory {}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("hexline: expecting argument 1 to be string")]
    HexSource,

    #[error("hexline: expecting argument 2 to be integer greater than zero")]
    HexPosition,

    #[error("hexline: position ({position}) exceeds length ({length})")]
    HexOutOfRange { position: usize, length: usize },
}

impl Pipe3Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Pipe3Error::InvalidRequest => ErrorKind::Request,
            Pipe3Error::ArgumentAllocation
            | Pipe3Error::StdinPipe(_)
            | Pipe3Error::StdoutPipe(_)
            | Pipe3Error::StderrPipe(_)
            | Pipe3Error::Fork(_)
            | Pipe3Error::ThreadSpawn(_) => ErrorKind::Setup,
            Pipe3Error::WriteStdin { .. } => ErrorKind::Transfer,
            Pipe3Error::ChildStart { .. } => ErrorKind::ChildStart,
            Pipe3Error::Read { .. } | Pipe3Error::Wait(_) | Pipe3Error::Directory { .. } => {
                ErrorKind::Io
            }
            Pipe3Error::InvalidConfig(_)
            | Pipe3Error::HexSource
            | Pipe3Error::HexPosition
            | Pipe3Error::HexOutOfRange { .. } => ErrorKind::Config,
        }
    }

    /// Output collected from a child that ran but whose transfer failed
    pub fn captured(&self) -> Option<&Captured> {
        match self {
            Pipe3Error::WriteStdin { captured, .. } | Pipe3Error::Read { captured, .. } => {
                Some(captured.as_ref())
            }
            _ => None,
        }
    }

    /// The diagnostic as the byte buffer handed back to script callers.
    pub fn to_message_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}
