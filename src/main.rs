use std::process::ExitCode;

use clap::Parser;
use mutex_lease::cli::{self, Cli, Root};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => match cli::usage_for(&err) {
            Some(usage) => {
                eprintln!("{}", err);
                println!("{}", usage);
                return ExitCode::from(2);
            }
            None => err.exit(),
        },
    };

    let level = match args.verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match args.config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let Root::Mutex { command } = args.command;
    match cli::run(command, &config).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
