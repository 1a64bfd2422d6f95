//! Child exit status and captured streams

use std::fmt;

/// How the child ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Exited normally with this code
    Exited(i32),
    /// Terminated by this signal number
    Signaled(i32),
}

impl ExitStatus {
    /// Exit code, if the child exited normally
    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Exited(code) => Some(*code),
            ExitStatus::Signaled(_) => None,
        }
    }

    /// Terminating signal, if any
    pub fn signal(&self) -> Option<i32> {
        match self {
            ExitStatus::Exited(_) => None,
            ExitStatus::Signaled(signal) => Some(*signal),
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }

    /// Shell-style code: the exit code, or 128 + signal
    pub fn shell_code(&self) -> i32 {
        match self {
            ExitStatus::Exited(code) => *code,
            ExitStatus::Signaled(signal) => 128 + signal,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Exited(code) => write!(f, "exit code {}", code),
            ExitStatus::Signaled(signal) => write!(f, "signal {}", signal),
        }
    }
}

/// What was collected from a child whose run still failed.
///
/// A stream that failed to read, or was never read, is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: ExitStatus,
}

impl Captured {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_accessors() {
        let exited = ExitStatus::Exited(3);
        assert_eq!(exited.code(), Some(3));
        assert_eq!(exited.signal(), None);
        assert!(!exited.success());
        assert_eq!(exited.shell_code(), 3);
        assert_eq!(exited.to_string(), "exit code 3");

        let killed = ExitStatus::Signaled(libc::SIGKILL);
        assert_eq!(killed.code(), None);
        assert_eq!(killed.shell_code(), 128 + libc::SIGKILL);
        assert_eq!(killed.to_string(), "signal 9");

        assert!(ExitStatus::Exited(0).success());
    }

    #[test]
    fn test_captured_stderr_lossy() {
        let captured = Captured {
            stdout: Vec::new(),
            stderr: b"bad input\n".to_vec(),
            status: ExitStatus::Exited(2),
        };
        assert_eq!(captured.stderr_lossy(), "bad input\n");
    }
}
