//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::error::Error as _;

use waymark_cli::CliError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match waymark_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) if !err.use_stderr() => {
            print!("{err}");
        }
        Err(err) => {
            report(&err);
            std::process::exit(1);
        }
    }
}

fn report(err: &CliError) {
    eprintln!("waymark: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    if !matches!(err, CliError::ArgumentParsing(_) | CliError::Process { .. }) {
        eprintln!("\n{}", waymark_cli::usage());
    }
}
