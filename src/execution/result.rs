//! Result assembly: turn a finished transfer into the caller's contract

use super::orchestrator::Transfer;
use super::spawn::{ChildStart, ExitStatus};
use pipe3_core::{Captured, Pipe3Error, Result, Stream};

/// Everything captured from a child that started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub stdout: Vec<u8>,
    /// Whatever the program wrote to stderr; not an error by itself.
    pub stderr: Vec<u8>,
    pub status: ExitStatus,
}

impl Output {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Precedence: child start failure, then stdin write failure, then read
/// failures. Non-empty stderr and non-zero exit codes are returned as data.
///
/// Transfer and read errors carry whatever was captured, so a child that
/// rejected its input can still explain why on stderr.
pub(crate) fn assemble(transfer: Transfer, status: ExitStatus) -> Result<Output> {
    let Transfer {
        stdin,
        stdout,
        stderr,
    } = transfer;

    if let Ok(captured) = &stderr {
        if let ChildStart::FailedToStart { errno, reason } = ChildStart::from_stderr(captured) {
            return Err(Pipe3Error::ChildStart { reason, errno });
        }
    }

    match (stdin, stdout, stderr) {
        (Ok(()), Ok(stdout), Ok(stderr)) => Ok(Output {
            stdout,
            stderr,
            status,
        }),
        (Err(source), stdout, stderr) => Err(Pipe3Error::WriteStdin {
            source,
            captured: captured(stdout, stderr, status),
        }),
        (Ok(()), Err(source), stderr) => Err(Pipe3Error::Read {
            stream: Stream::Stdout,
            source,
            captured: captured(Ok(Vec::new()), stderr, status),
        }),
        (Ok(()), Ok(stdout), Err(source)) => Err(Pipe3Error::Read {
            stream: Stream::Stderr,
            source,
            captured: captured(Ok(stdout), Ok(Vec::new()), status),
        }),
    }
}

fn captured(
    stdout: std::io::Result<Vec<u8>>,
    stderr: std::io::Result<Vec<u8>>,
    status: ExitStatus,
) -> Box<Captured> {
    Box::new(Captured {
        stdout: stdout.unwrap_or_default(),
        stderr: stderr.unwrap_or_default(),
        status,
    })
}

/// Collapse a rich result into the byte contract used by script callers:
/// stdout on success, the diagnostic text otherwise.
pub fn into_bytes(result: Result<Output>) -> std::result::Result<Vec<u8>, Vec<u8>> {
    result
        .map(|output| output.stdout)
        .map_err(|err| err.to_message_bytes())
}
