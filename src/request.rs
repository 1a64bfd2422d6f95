//! Command requests and their exec-ready form

use pipe3_core::{Pipe3Error, Result};
use std::ffi::CString;
use std::os::raw::c_char;

/// A program invocation: `argv[0]` is the executable path, the rest are
/// passed verbatim as positional arguments, and `stdin` is fed to the child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    argv: Vec<String>,
    stdin: Vec<u8>,
}

impl CommandRequest {
    /// Build a request with an empty input payload.
    ///
    /// Fails with [`Pipe3Error::InvalidRequest`] when `argv` is empty.
    pub fn new<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        if argv.is_empty() {
            return Err(Pipe3Error::InvalidRequest);
        }
        Ok(Self {
            argv,
            stdin: Vec::new(),
        })
    }

    /// Set the bytes written to the child's standard input.
    pub fn with_stdin(mut self, stdin: impl Into<Vec<u8>>) -> Self {
        self.stdin = stdin.into();
        self
    }

    /// The executable path, `argv[0]`
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn stdin(&self) -> &[u8] {
        &self.stdin
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<u8>) {
        (self.argv, self.stdin)
    }
}

/// Everything the child needs after `fork`, prepared up front so the child
/// never allocates.
pub(crate) struct PreparedArgv {
    args: Vec<CString>,
    ptrs: Vec<*const c_char>,
    start_failure: Vec<u8>,
}

impl PreparedArgv {
    pub(crate) fn new(argv: &[String]) -> Result<Self> {
        if argv.is_empty() {
            return Err(Pipe3Error::InvalidRequest);
        }

        let args = argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Pipe3Error::ArgumentAllocation)?;

        let mut ptrs: Vec<*const c_char> = args.iter().map(|arg| arg.as_ptr()).collect();
        ptrs.push(std::ptr::null());

        let start_failure = format!("error calling {}", argv[0]).into_bytes();

        Ok(Self {
            args,
            ptrs,
            start_failure,
        })
    }

    /// Path handed to `execv`; same storage as `argv[0]`
    pub(crate) fn path(&self) -> *const c_char {
        self.ptrs[0]
    }

    /// Null-terminated argument vector
    pub(crate) fn argv(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }

    pub(crate) fn program(&self) -> &CString {
        &self.args[0]
    }

    /// Diagnostic reported when the program image cannot be replaced
    pub(crate) fn start_failure(&self) -> &[u8] {
        &self.start_failure
    }
}
