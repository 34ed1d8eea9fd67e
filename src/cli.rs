use std::{process::ExitCode, time::Duration};

use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser, Subcommand};
use tracing::debug;

use crate::{
    config::{ClientConfig, DEFAULT_SERVER},
    error::ConfigError,
    interface::report::{self, body_text, LockOutput, StdoutReporter},
    lease::{manager::LeaseManager, LeaseHandle, LeaseName, LeaseToken},
    util::spawn_shutdown_watcher,
};

#[derive(Parser, Debug)]
#[command(name = "mutex-lease", version, about, long_about = None)]
pub struct Cli {
    /// Base address of the coordination service
    #[arg(long, env = "MUTEX_SERVER", default_value = DEFAULT_SERVER, global = true)]
    pub server: String,

    /// Seconds before a single request to the service is abandoned
    #[arg(long, default_value_t = 10, global = true)]
    pub request_timeout: u64,

    /// Verbose mode (-v, -vv, -vvv)
    #[arg(short, action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Root,
}

#[derive(Subcommand, Debug)]
pub enum Root {
    /// Named mutex operations
    Mutex {
        #[command(subcommand)]
        command: MutexCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum MutexCommand {
    /// Locks a mutex
    #[command(visible_alias = "l")]
    Lock {
        /// Name of the mutex
        #[arg(short, long)]
        name: String,
        /// Formats the output
        #[arg(short, long, value_enum, default_value_t = LockOutput::Json)]
        output: LockOutput,
        /// Seconds to keep trying while the mutex is locked by someone else
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        timeout: i64,
    },
    /// Shows the current state of a mutex
    #[command(visible_alias = "g")]
    Get {
        /// Name of the mutex
        #[arg(short, long)]
        name: String,
    },
    /// Extends the lifetime of a held mutex
    #[command(visible_alias = "r")]
    Refresh {
        /// Name of the mutex
        #[arg(short, long)]
        name: String,
        /// Token for manipulating an existing mutex
        #[arg(short, long)]
        token: String,
    },
    /// Releases a held mutex
    #[command(visible_alias = "u")]
    Unlock {
        /// Name of the mutex
        #[arg(short, long)]
        name: String,
        /// Token for manipulating an existing mutex
        #[arg(short, long)]
        token: String,
    },
    /// Keeps refreshing a held mutex until interrupted, then releases it
    #[command(visible_alias = "a")]
    AutoRefresh {
        /// Name of the mutex
        #[arg(short, long)]
        name: String,
        /// Token for manipulating an existing mutex
        #[arg(short, long)]
        token: String,
    },
}

impl Cli {
    pub fn config(&self) -> Result<ClientConfig, ConfigError> {
        if self.request_timeout == 0 {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        ClientConfig::new(&self.server)
            .map(|config| config.with_request_timeout(Duration::from_secs(self.request_timeout)))
    }
}

/// Help for every `mutex` subcommand, one block each. Shown when a
/// subcommand is not recognised.
pub fn usage() -> String {
    let mut root = Cli::command();
    let mut listing = Vec::new();
    if let Some(mutex) = root.find_subcommand_mut("mutex") {
        for command in mutex.get_subcommands_mut() {
            let name = command.get_name().to_string();
            listing.push(format!("mutex {}\n{}", name, command.render_help()));
        }
    }
    listing.join("\n")
}

/// The usage listing to print for `err`, if it is an unknown subcommand.
pub fn usage_for(err: &clap::Error) -> Option<String> {
    match err.kind() {
        ErrorKind::InvalidSubcommand => Some(usage()),
        _ => None,
    }
}

/// Runs one command against the service described by `config`.
pub async fn run(command: MutexCommand, config: &ClientConfig) -> anyhow::Result<ExitCode> {
    let manager = LeaseManager::connect(config)?;
    debug!(server = %config.server, "dispatching");

    let code = match command {
        MutexCommand::Lock {
            name,
            output,
            timeout,
        } => {
            let name = LeaseName::new(name);
            report::finish(
                manager
                    .acquire(&name, timeout)
                    .await
                    .and_then(|grant| report::render_lock(&grant, output)),
            )
        }
        MutexCommand::Get { name } => report::finish(
            manager
                .inspect(&LeaseName::new(name))
                .await
                .map(|body| body_text(&body)),
        ),
        MutexCommand::Refresh { name, token } => report::finish(
            manager
                .renew(&LeaseName::new(name), &LeaseToken::new(token))
                .await
                .map(|grant| body_text(grant.body())),
        ),
        MutexCommand::Unlock { name, token } => report::finish(
            manager
                .release(&LeaseName::new(name), &LeaseToken::new(token))
                .await
                .map(|body| body_text(&body)),
        ),
        MutexCommand::AutoRefresh { name, token } => {
            let handle = LeaseHandle::new(LeaseName::new(name), LeaseToken::new(token));
            let stop = spawn_shutdown_watcher();
            report::finish_renewal(manager.auto_renew(handle, StdoutReporter, stop).await)
        }
    };

    Ok(code)
}
