//! pipe3 CLI - run a program over three pipes and capture its output

mod cli;
mod commands;
mod logging;
mod runner;

use clap::Parser;
use cli::{Cli, Commands};
use commands::check_requirements;
use console::style;
use runner::{InputSource, OutputFormat, RunConfig, failure_code, run_program};

fn fail(err: &(dyn std::error::Error + 'static)) -> ! {
    eprintln!("{} {}", style("error:").red().bold(), err);
    std::process::exit(failure_code(err));
}

fn run_config(cli: &Cli, program: String, args: Vec<String>) -> RunConfig {
    let input = match (&cli.input, cli.no_stdin) {
        (Some(path), _) => InputSource::File(path.clone()),
        (None, true) => InputSource::Empty,
        (None, false) => InputSource::Stdin,
    };
    let format = if cli.json {
        OutputFormat::Json
    } else if cli.hex {
        OutputFormat::Hex
    } else {
        OutputFormat::Raw
    };

    RunConfig {
        program,
        args,
        input,
        format,
        sequential: cli.sequential,
        chunk_size: cli.chunk_size,
    }
}

fn run(config: RunConfig) -> ! {
    match run_program(config) {
        Ok(code) => std::process::exit(code),
        Err(e) => fail(e.as_ref()),
    }
}

fn main() {
    let mut cli = Cli::parse();

    logging::init_logger(cli.verbose);

    if cli.check {
        check_requirements();
        return;
    }

    if let Some(command) = cli.command.take() {
        match command {
            Commands::Run { program, args } => run(run_config(&cli, program, args)),
            Commands::Hexdump { file } => {
                if let Err(e) = commands::hexdump(file) {
                    fail(e.as_ref());
                }
            }
            Commands::Mkdir { path } => {
                if let Err(e) = commands::mkdir(&path) {
                    fail(e.as_ref());
                }
            }
            Commands::Check => check_requirements(),
        }
        return;
    }

    let Some(program) = cli.program.take() else {
        eprintln!("{} No program specified", style("error:").red().bold());
        eprintln!(
            "Try {} for more information",
            style("pipe3-ctl --help").cyan()
        );
        std::process::exit(1);
    };

    let args = std::mem::take(&mut cli.args);
    run(run_config(&cli, program, args));
}
