use console::style;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;

/// Level used when `RUST_LOG` is unset
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Send log records to stderr; stdout carries the child's output.
pub fn init_logger(verbose: bool) {
    let level = default_level(verbose);
    let env = Env::default().filter_or("RUST_LOG", level.as_str());

    Builder::from_env(env)
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => style("ERROR").red().bold(),
                Level::Warn => style("WARN ").yellow().bold(),
                Level::Info => style("INFO ").green(),
                Level::Debug => style("DEBUG").cyan(),
                Level::Trace => style("TRACE").dim(),
            };
            writeln!(
                buf,
                "{} {} {}",
                level,
                style(record.target()).dim(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
