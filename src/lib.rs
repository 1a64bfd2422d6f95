//! pipe3: run a program over three pipes
//!
//! Spawns a program as a child process, writes an input payload to its
//! standard input, waits for it to finish, and hands back everything it wrote
//! to standard output and standard error.
//!
//! Arguments go to `execv` verbatim: no shell, no glob or variable expansion,
//! no `PATH` search. `argv[0]` must be a path the kernel can execute.
//!
//! # Modules
//!
//! - **request**: command requests and their exec-ready form
//! - **execution**: pipe triad, fork/exec, transfer, result assembly
//! - **config**: drain strategy and read size
//! - **executor**: runs requests with a configuration
//!
//! # Example
//!
//! ```ignore
//! let output = pipe3::execute(["/bin/cat"], b"hello")?;
//! assert_eq!(output.stdout, b"hello");
//!
//! let err = pipe3::pipe3(["/nonexistent/path"], b"").unwrap_err();
//! assert_eq!(err, b"error calling /nonexistent/path");
//! ```

pub mod config;
pub mod execution;
pub mod executor;
#[cfg(feature = "python")]
pub mod python;
pub mod request;

pub use config::{DEFAULT_CHUNK_SIZE, DrainMode, ExecConfig, MAX_CHUNK_SIZE};
pub use execution::{ChildStart, ExitStatus, Output};
pub use executor::Executor;
pub use pipe3_core::{self, Captured, ErrorKind, Pipe3Error, Result, Stream, util};
pub use request::CommandRequest;

/// Run `argv` with `stdin` as its input using the default configuration.
pub fn execute<I, S>(argv: I, stdin: &[u8]) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let request = CommandRequest::new(argv)?.with_stdin(stdin);
    Executor::default().run(request)
}

/// Byte contract: the child's stdout, or the diagnostic text.
///
/// stderr from a child that started is discarded here; use [`execute`] to
/// see it.
pub fn pipe3<I, S>(argv: I, stdin: &[u8]) -> std::result::Result<Vec<u8>, Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    execution::into_bytes(execute(argv, stdin))
}
