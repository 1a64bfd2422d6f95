use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pipe3-ctl")]
#[command(version, about = "Run a program over three pipes and capture what it writes", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Direct execution: our stdin goes to the program
    echo hello | pipe3-ctl /bin/cat
    pipe3-ctl --input data.bin --hex /bin/cat
    pipe3-ctl --no-stdin --json -- /bin/sh -c 'echo out; echo err >&2'

    # Using subcommands
    pipe3-ctl run --sequential /bin/cat
    pipe3-ctl hexdump data.bin
    pipe3-ctl mkdir /tmp/a/b/c
    pipe3-ctl check
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Program to run, as an absolute or relative path (no PATH search)
    #[arg(value_name = "PROGRAM")]
    pub program: Option<String>,

    /// Program arguments, passed verbatim
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Read the program's input from FILE instead of stdin
    #[arg(short, long, value_name = "FILE", global = true, conflicts_with = "no_stdin")]
    pub input: Option<PathBuf>,

    /// Give the program empty input
    #[arg(long, global = true)]
    pub no_stdin: bool,

    /// Print stdout as a hex dump
    #[arg(long, global = true, conflicts_with = "json")]
    pub hex: bool,

    /// Print a JSON report instead of raw output
    #[arg(long, global = true)]
    pub json: bool,

    /// Write all input before reading any output
    #[arg(long, global = true)]
    pub sequential: bool,

    /// Read size for the output pipes
    #[arg(long, value_name = "BYTES", global = true)]
    pub chunk_size: Option<usize>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Check platform requirements
    #[arg(long)]
    pub check: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a program over three pipes
    Run {
        /// Program to run
        program: String,

        /// Program arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Hex dump a file, or stdin when no file is given
    Hexdump {
        file: Option<PathBuf>,
    },

    /// Create a directory and any missing parents
    Mkdir {
        path: PathBuf,
    },

    /// Check platform requirements
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_mode_keeps_program_arguments() {
        let cli = Cli::parse_from(["pipe3-ctl", "--json", "/bin/echo", "a", "b"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.program.as_deref(), Some("/bin/echo"));
        assert_eq!(cli.args, ["a", "b"]);
        assert!(cli.json);
    }

    #[test]
    fn run_subcommand_takes_global_flags() {
        let cli = Cli::parse_from(["pipe3-ctl", "run", "--sequential", "/bin/cat"]);
        assert!(cli.sequential);
        match cli.command {
            Some(Commands::Run { program, args }) => {
                assert_eq!(program, "/bin/cat");
                assert!(args.is_empty());
            }
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn hex_and_json_conflict() {
        assert!(Cli::try_parse_from(["pipe3-ctl", "--hex", "--json", "/bin/true"]).is_err());
    }

    #[test]
    fn input_and_no_stdin_conflict() {
        assert!(
            Cli::try_parse_from(["pipe3-ctl", "--input", "x", "--no-stdin", "/bin/true"]).is_err()
        );
    }
}
