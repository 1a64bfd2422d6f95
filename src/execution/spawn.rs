//! Process spawner: fork, rewire the standard streams, exec
//!
//! The child side only makes async-signal-safe calls: everything it touches
//! (argument vector, diagnostic text) is prepared before `fork`, and the
//! parent's `OwnedFd`s are never dropped in the child because it either
//! execs or `_exit`s.

use super::pipes::{ParentEnds, PipeTriad, RawTriad};
use crate::request::PreparedArgv;
use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork};
use pipe3_core::{Pipe3Error, Result};
use std::os::unix::io::RawFd;

/// Exit status used by a child that never reached the target program
pub const START_FAILURE_EXIT: i32 = 127;

/// Opens a start-failure record on the child's stderr.
///
/// The record is `MARKER <errno digits> NUL <reason>`. A program that really
/// ran would have to emit this exact NUL-framed prefix to be mistaken for one.
pub(crate) const START_FAILURE_MARKER: &[u8] = b"\0pipe3:start-failed:";

pub use pipe3_core::ExitStatus;

const REDIRECT_FAILURE: &[u8] = b"error redirecting child's standard streams";

/// Whether the child reached the target program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildStart {
    Started,
    FailedToStart { errno: Option<i32>, reason: String },
}

impl ChildStart {
    /// Decode the child's captured stderr.
    ///
    /// Anything not opening with the start-failure marker is ordinary program
    /// output and means the child started.
    pub fn from_stderr(stderr: &[u8]) -> Self {
        let Some(record) = stderr.strip_prefix(START_FAILURE_MARKER) else {
            return ChildStart::Started;
        };

        let (errno, reason) = match record.iter().position(|&b| b == 0) {
            Some(split) => (
                std::str::from_utf8(&record[..split])
                    .ok()
                    .and_then(|digits| digits.parse().ok()),
                &record[split + 1..],
            ),
            None => (None, record),
        };

        ChildStart::FailedToStart {
            errno,
            reason: String::from_utf8_lossy(reason).into_owned(),
        }
    }
}

/// A forked child; reaped once by [`ChildProcess::wait`].
///
/// Dropping a child that was never waited for reaps it, so an unwinding
/// caller leaves no zombie behind.
#[derive(Debug)]
pub struct ChildProcess {
    pid: Pid,
    program: String,
    reaped: bool,
}

impl ChildProcess {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Block until the child terminates and reap it.
    pub fn wait(mut self) -> Result<ExitStatus> {
        self.reaped = true;
        wait_for_child(self.pid)
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        match wait_for_child(self.pid) {
            Ok(status) => debug!(
                "reaped abandoned {} (pid {}): {}",
                self.program, self.pid, status
            ),
            Err(e) => warn!("could not reap {} (pid {}): {}", self.program, self.pid, e),
        }
    }
}

/// Fork a child wired to `triad` and exec `argv` in it.
///
/// Returns the child and the parent's ends; the child's ends are closed in
/// the parent before this returns. If `fork` fails every end is closed and
/// no process exists.
pub(crate) fn spawn(argv: &PreparedArgv, triad: PipeTriad) -> Result<(ChildProcess, ParentEnds)> {
    let raw = triad.raw();

    // SAFETY: the child branch only calls async-signal-safe functions and
    // never returns.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => unsafe { exec_child(&raw, argv) },
        Ok(ForkResult::Parent { child }) => {
            let (parent, child_ends) = triad.split();
            // The parent must not hold the child's ends, or end-of-stream never arrives.
            drop(child_ends);

            let program = argv.program().to_string_lossy().into_owned();
            debug!("spawned {} as pid {}", program, child);
            Ok((
                ChildProcess {
                    pid: child,
                    program,
                    reaped: false,
                },
                parent,
            ))
        }
        Err(errno) => Err(Pipe3Error::Fork(errno)),
    }
}

/// Child side of the fork. Never returns.
unsafe fn exec_child(raw: &RawTriad, argv: &PreparedArgv) -> ! {
    if libc::dup2(raw.child_stdin, libc::STDIN_FILENO) < 0
        || libc::dup2(raw.child_stdout, libc::STDOUT_FILENO) < 0
        || libc::dup2(raw.child_stderr, libc::STDERR_FILENO) < 0
    {
        report_start_failure(raw.child_stderr, Errno::last() as i32, REDIRECT_FAILURE);
        libc::_exit(START_FAILURE_EXIT);
    }

    // The originals all sit above fd 2, so none of them is a rewired stream.
    for fd in raw.all() {
        libc::close(fd);
    }

    // Ignored signals stay ignored across exec; give the program the default.
    libc::signal(libc::SIGPIPE, libc::SIG_DFL);

    libc::execv(argv.path(), argv.argv());

    report_start_failure(libc::STDERR_FILENO, Errno::last() as i32, argv.start_failure());
    libc::_exit(START_FAILURE_EXIT);
}

/// Write a start-failure record without allocating.
unsafe fn report_start_failure(fd: RawFd, errno: i32, reason: &[u8]) {
    let mut digits = [0u8; 12];
    let errno_text = format_decimal(errno, &mut digits);

    write_fully(fd, START_FAILURE_MARKER);
    write_fully(fd, errno_text);
    write_fully(fd, b"\0");
    write_fully(fd, reason);
}

unsafe fn write_fully(fd: RawFd, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        let n = libc::write(fd, bytes.as_ptr().cast(), bytes.len());
        if n < 0 {
            if Errno::last() == Errno::EINTR {
                continue;
            }
            return;
        }
        bytes = &bytes[n as usize..];
    }
}

/// Render a non-negative errno into `buf`, returning the used tail.
fn format_decimal(value: i32, buf: &mut [u8; 12]) -> &[u8] {
    let mut n = value.unsigned_abs();
    let mut at = buf.len();
    loop {
        at -= 1;
        buf[at] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[at..]
}

/// Wait for child process and get exit status
fn wait_for_child(pid: Pid) -> Result<ExitStatus> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ExitStatus::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                return Ok(ExitStatus::Signaled(signal as i32));
            }
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(Pipe3Error::Wait(errno)),
        }
    }
}
