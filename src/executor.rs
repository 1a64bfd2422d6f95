//! Executor: one request in, one result out

use crate::config::ExecConfig;
use crate::execution::orchestrator::orchestrate;
use crate::execution::pipes::PipeTriad;
use crate::execution::result::{Output, assemble};
use crate::execution::spawn::spawn;
use crate::request::{CommandRequest, PreparedArgv};
use log::{debug, warn};
use pipe3_core::{Pipe3Error, Result};

/// Runs command requests with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecConfig,
}

impl Executor {
    pub fn new(config: ExecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    /// Run `request` to completion.
    ///
    /// Request and setup errors are returned before anything is spawned.
    /// Once a child exists it is always reaped, whatever happens to the pipes.
    pub fn run(&self, request: CommandRequest) -> Result<Output> {
        let (argv, stdin) = request.into_parts();
        let prepared = PreparedArgv::new(&argv)?;
        let triad = PipeTriad::allocate()?;

        let (child, ends) = spawn(&prepared, triad)?;
        let pid = child.pid();
        let program = child.program().to_string();

        // If the transfer unwinds, dropping `child` still reaps it.
        let transfer = orchestrate(ends, &stdin, &self.config);
        let status = child.wait();
        let transfer = transfer?;
        let status = status?;
        debug!("{} (pid {}) finished with {}", program, pid, status);

        let result = assemble(transfer, status);
        if let Err(Pipe3Error::ChildStart { reason, errno }) = &result {
            warn!("child could not start: {} (errno {:?})", reason, errno);
        }
        result
    }
}
