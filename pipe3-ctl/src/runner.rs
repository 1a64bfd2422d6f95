use log::{debug, info};
use pipe3::pipe3_core::HexDump;
use pipe3::{CommandRequest, DrainMode, ExecConfig, Executor, Output, Pipe3Error};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Where the program's input payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    Empty,
}

impl InputSource {
    pub fn load(&self) -> io::Result<Vec<u8>> {
        match self {
            InputSource::Stdin => {
                let mut buf = Vec::new();
                io::stdin().lock().read_to_end(&mut buf)?;
                Ok(buf)
            }
            InputSource::File(path) => fs::read(path),
            InputSource::Empty => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Raw,
    Hex,
    Json,
}

/// Configuration for one program run
pub struct RunConfig {
    pub program: String,
    pub args: Vec<String>,
    pub input: InputSource,
    pub format: OutputFormat,
    pub sequential: bool,
    pub chunk_size: Option<usize>,
}

impl RunConfig {
    fn exec_config(&self) -> ExecConfig {
        let mut config = ExecConfig::default();
        if self.sequential {
            config = config.drain(DrainMode::Sequential);
        }
        if let Some(size) = self.chunk_size {
            config = config.chunk_size(size);
        }
        config
    }

    fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// JSON form of a finished run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub argv: Vec<String>,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub stdout_bytes: usize,
    pub stderr_bytes: usize,
    pub elapsed_ms: u128,
}

impl RunReport {
    pub fn new(argv: Vec<String>, output: &Output, elapsed_ms: u128) -> Self {
        Self {
            argv,
            exit_code: output.status.code(),
            signal: output.status.signal(),
            stdout: output.stdout_lossy(),
            stderr: output.stderr_lossy(),
            stdout_bytes: output.stdout.len(),
            stderr_bytes: output.stderr.len(),
            elapsed_ms,
        }
    }
}

/// Run the program and print its output; returns the exit code to use.
pub fn run_program(config: RunConfig) -> Result<i32, Box<dyn std::error::Error>> {
    let executor = Executor::new(config.exec_config())?;
    debug!("Executor config: {:?}", executor.config());

    let input = config.input.load()?;
    debug!("Loaded {} input bytes from {:?}", input.len(), config.input);

    let argv = config.argv();
    let request = CommandRequest::new(argv.clone())?.with_stdin(input);

    info!("Executing: {} {:?}", config.program, config.args);
    let started = Instant::now();
    let output = match executor.run(request) {
        Ok(output) => output,
        Err(err) => {
            // Show what the child said before the run failed.
            if let Some(captured) = err.captured() {
                io::stderr().lock().write_all(&captured.stderr)?;
            }
            return Err(err.into());
        }
    };
    let elapsed_ms = started.elapsed().as_millis();
    info!("{} finished with {} in {}ms", config.program, output.status, elapsed_ms);

    let mut stdout = io::stdout().lock();
    match config.format {
        OutputFormat::Raw => {
            stdout.write_all(&output.stdout)?;
            io::stderr().lock().write_all(&output.stderr)?;
        }
        OutputFormat::Hex => {
            for line in HexDump::new(&output.stdout) {
                writeln!(stdout, "{}", line)?;
            }
            io::stderr().lock().write_all(&output.stderr)?;
        }
        OutputFormat::Json => {
            let report = RunReport::new(argv, &output, elapsed_ms);
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        }
    }
    stdout.flush()?;

    Ok(output.status.shell_code())
}

/// Exit code for a run that produced no status of its own
pub fn failure_code(err: &(dyn std::error::Error + 'static)) -> i32 {
    match err.downcast_ref::<Pipe3Error>() {
        Some(Pipe3Error::ChildStart { .. }) => pipe3::execution::START_FAILURE_EXIT,
        _ => 1,
    }
}
