//! Parent orchestrator: feed the child's stdin, drain its stdout and stderr
//!
//! The write end of the input pipe is always closed once writing finishes or
//! fails, so the child sees end-of-input and is never left waiting.

use super::pipes::ParentEnds;
use crate::config::{DrainMode, ExecConfig};
use log::{trace, warn};
use pipe3_core::{Pipe3Error, Result};
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::unix::io::OwnedFd;
use std::panic;
use std::thread;

/// What happened on each of the three pipes
#[derive(Debug)]
pub(crate) struct Transfer {
    pub stdin: io::Result<()>,
    pub stdout: io::Result<Vec<u8>>,
    pub stderr: io::Result<Vec<u8>>,
}

/// Run the transfer phase over the parent's ends, consuming them.
pub(crate) fn orchestrate(ends: ParentEnds, input: &[u8], config: &ExecConfig) -> Result<Transfer> {
    match config.drain {
        DrainMode::Concurrent => concurrent(ends, input, config.chunk_size),
        DrainMode::Sequential => Ok(sequential(ends, input, config.chunk_size)),
    }
}

fn sequential(ends: ParentEnds, input: &[u8], chunk_size: usize) -> Transfer {
    let ParentEnds {
        stdin,
        stdout,
        stderr,
    } = ends;

    let fed = feed(stdin, input);
    if let Err(e) = &fed {
        // Skip the read phase; dropping the read ends closes them.
        warn!("writing {} bytes to child's stdin failed: {}", input.len(), e);
        return Transfer {
            stdin: fed,
            stdout: Ok(Vec::new()),
            stderr: Ok(Vec::new()),
        };
    }

    let stdout = drain(stdout, chunk_size);
    let stderr = drain(stderr, chunk_size);
    Transfer {
        stdin: fed,
        stdout,
        stderr,
    }
}

fn concurrent(ends: ParentEnds, input: &[u8], chunk_size: usize) -> Result<Transfer> {
    let ParentEnds {
        stdin,
        stdout,
        stderr,
    } = ends;

    thread::scope(|scope| {
        let writer = thread::Builder::new()
            .name("pipe3-stdin".to_string())
            .spawn_scoped(scope, move || feed(stdin, input))
            .map_err(Pipe3Error::ThreadSpawn)?;
        let errors = thread::Builder::new()
            .name("pipe3-stderr".to_string())
            .spawn_scoped(scope, move || drain(stderr, chunk_size))
            .map_err(Pipe3Error::ThreadSpawn)?;

        let stdout = drain(stdout, chunk_size);
        let stderr = errors.join().unwrap_or_else(|p| panic::resume_unwind(p));
        let fed = writer.join().unwrap_or_else(|p| panic::resume_unwind(p));

        if let Err(e) = &fed {
            warn!("writing {} bytes to child's stdin failed: {}", input.len(), e);
        }
        Ok(Transfer {
            stdin: fed,
            stdout,
            stderr,
        })
    })
}

/// Write the whole payload, then close the pipe.
fn feed(fd: OwnedFd, input: &[u8]) -> io::Result<()> {
    let mut pipe = File::from(fd);
    if !input.is_empty() {
        pipe.write_all(input)?;
    }
    trace!("wrote {} bytes to child's stdin", input.len());
    Ok(())
}

/// Read in `chunk_size` pieces until end-of-stream.
fn drain(fd: OwnedFd, chunk_size: usize) -> io::Result<Vec<u8>> {
    let mut pipe = File::from(fd);
    let mut captured = Vec::new();
    let mut chunk = vec![0u8; chunk_size];

    loop {
        match pipe.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => captured.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    trace!("drained {} bytes", captured.len());
    Ok(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::fcntl::OFlag;
    use nix::unistd::pipe2;

    fn pipe() -> (OwnedFd, OwnedFd) {
        pipe2(OFlag::O_CLOEXEC).unwrap()
    }

    #[test]
    fn test_drain_reads_across_chunks() {
        let (read, write) = pipe();
        let mut writer = File::from(write);
        writer.write_all(b"0123456789").unwrap();
        drop(writer);

        assert_eq!(drain(read, 3).unwrap(), b"0123456789");
    }

    #[test]
    fn test_drain_empty_stream() {
        let (read, write) = pipe();
        drop(write);
        assert!(drain(read, 4096).unwrap().is_empty());
    }

    #[test]
    fn test_feed_closes_pipe() {
        let (read, write) = pipe();
        feed(write, b"payload").unwrap();

        let mut received = Vec::new();
        File::from(read).read_to_end(&mut received).unwrap();
        assert_eq!(received, b"payload");
    }

    #[test]
    fn test_feed_without_reader_fails() {
        let (read, write) = pipe();
        drop(read);
        let err = feed(write, b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_feed_empty_payload_never_writes() {
        let (read, write) = pipe();
        drop(read);
        assert!(feed(write, b"").is_ok());
    }

    // Loops the triad back on itself: what is fed to stdin comes out of stdout.
    fn looped_ends(stderr_bytes: &[u8]) -> ParentEnds {
        let (loop_read, loop_write) = pipe();
        let (err_read, err_write) = pipe();
        let mut err = File::from(err_write);
        err.write_all(stderr_bytes).unwrap();
        drop(err);

        ParentEnds {
            stdin: loop_write,
            stdout: loop_read,
            stderr: err_read,
        }
    }

    #[test]
    fn test_concurrent_loopback_larger_than_pipe_buffer() {
        let input: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
        let transfer = orchestrate(looped_ends(b"warn"), &input, &ExecConfig::default()).unwrap();

        assert!(transfer.stdin.is_ok());
        assert_eq!(transfer.stdout.unwrap(), input);
        assert_eq!(transfer.stderr.unwrap(), b"warn");
    }

    #[test]
    fn test_sequential_loopback_small_payload() {
        let transfer =
            orchestrate(looped_ends(b""), b"small", &ExecConfig::sequential()).unwrap();

        assert_eq!(transfer.stdout.unwrap(), b"small");
        assert!(transfer.stderr.unwrap().is_empty());
    }

    #[test]
    fn test_sequential_write_failure_skips_reads() {
        let (in_read, in_write) = pipe();
        drop(in_read);
        let (out_read, out_write) = pipe();
        let (err_read, err_write) = pipe();
        // Holding the write ends would block any read; the skipped phase never reads.
        let ends = ParentEnds {
            stdin: in_write,
            stdout: out_read,
            stderr: err_read,
        };

        let transfer = orchestrate(ends, b"lost", &ExecConfig::sequential()).unwrap();
        assert!(transfer.stdin.is_err());
        assert!(transfer.stdout.unwrap().is_empty());
        assert!(transfer.stderr.unwrap().is_empty());
        drop((out_write, err_write));
    }
}
