//! Stress tests for pipe3
//!
//! Large payloads in both directions, guarded by a deadline so a deadlock
//! fails the test instead of hanging it.

use pipe3::{CommandRequest, ExecConfig, Executor, Output, execute};
use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

static STRESS_TEST_LOCK: Mutex<()> = Mutex::new(());

const DEADLINE: Duration = Duration::from_secs(30);

/// Run `argv` on a worker thread and fail if it does not finish in time.
fn run_with_deadline(argv: Vec<String>, input: Vec<u8>) -> Output {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(execute(argv, &input));
    });

    rx.recv_timeout(DEADLINE)
        .expect("pipe3 run did not finish before the deadline")
        .expect("pipe3 run failed")
}

fn sh(script: &str) -> Vec<String> {
    vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
}

/// One megabyte on both stdout and stderr at once
#[test]
fn stress_both_streams_one_megabyte() {
    let _lock = STRESS_TEST_LOCK.lock();

    let output = run_with_deadline(
        sh("head -c 1048576 /dev/zero; head -c 1048576 /dev/zero >&2"),
        Vec::new(),
    );
    assert_eq!(output.stdout.len(), 1024 * 1024);
    assert_eq!(output.stderr.len(), 1024 * 1024);
}

/// Interleaved writes to both streams
#[test]
fn stress_interleaved_streams() {
    let _lock = STRESS_TEST_LOCK.lock();

    let output = run_with_deadline(
        sh("i=0; while [ $i -lt 2000 ]; do echo out$i; echo err$i >&2; i=$((i+1)); done"),
        Vec::new(),
    );
    assert_eq!(output.stdout_lossy().lines().count(), 2000);
    assert_eq!(output.stderr_lossy().lines().count(), 2000);
}

/// Four megabytes through cat
#[test]
fn stress_large_round_trip() {
    let _lock = STRESS_TEST_LOCK.lock();

    let input: Vec<u8> = (0..4 * 1024 * 1024).map(|n: u32| (n % 251) as u8).collect();
    let output = run_with_deadline(vec!["/bin/cat".to_string()], input.clone());
    assert_eq!(output.stdout, input);
}

/// Many short runs back to back
#[test]
fn stress_rapid_runs() {
    let _lock = STRESS_TEST_LOCK.lock();

    let executor = Executor::new(ExecConfig::default()).unwrap();
    for i in 0..200 {
        let payload = format!("run-{}", i);
        let request = CommandRequest::new(["/bin/cat"])
            .unwrap()
            .with_stdin(payload.as_bytes());
        let output = executor.run(request).unwrap();
        assert_eq!(output.stdout, payload.as_bytes());
    }
}

/// Runs from several threads at once
#[test]
fn stress_parallel_runs() {
    let _lock = STRESS_TEST_LOCK.lock();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            thread::spawn(move || {
                for i in 0..25 {
                    let payload = format!("thread-{}-run-{}", t, i);
                    let output = execute(["/bin/cat"], payload.as_bytes()).unwrap();
                    assert_eq!(output.stdout, payload.as_bytes());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
