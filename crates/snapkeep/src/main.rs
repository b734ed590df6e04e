// SPDX-FileCopyrightText: 2026 Snapkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! snapkeep - snapshot backup and retention for Baserow databases.
//!
//! This is the binary entry point: batch runs over the configured projects
//! and single interactive actions against one database.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod actions;
mod output;
mod run;
mod settings;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use snapkeep_baserow::BaserowClient;
use snapkeep_config::{ConfigError, SnapkeepConfig, render_errors};
use snapkeep_core::{AuthProvider, Credentials, JobStatusService, SnapshotStore};
use tracing::{error, info};

use crate::actions::Action;
use crate::settings::Settings;

/// snapkeep - snapshot backup and retention for Baserow databases.
#[derive(Parser, Debug)]
#[command(name = "snapkeep", version, about, long_about = None)]
struct Cli {
    /// Configuration file, read in place of ./snapkeep.toml.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log what would be created or deleted without changing anything.
    #[arg(short, long, global = true)]
    dry_run: bool,

    /// Print action results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Process every configured database. Without --take, only report counts.
    Run {
        /// Take a backup of each database, then apply retention.
        #[arg(short, long)]
        take: bool,
    },
    /// Print the effective configuration, password masked.
    Config,
    #[command(flatten)]
    Action(Action),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match snapkeep_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.log.level.as_str()
    };
    init_tracing(level);

    ExitCode::from(execute(cli, &config).await)
}

async fn execute(cli: Cli, config: &SnapkeepConfig) -> u8 {
    let settings = Settings::from_config(config, cli.dry_run);
    match cli.command {
        Commands::Config => show_config(config),
        Commands::Run { take } => {
            let Some((client, credentials)) = prepare(config) else {
                return 1;
            };
            run::run_batch(&client, &credentials, &config.targets(), &settings, take)
                .await
                .exit_code()
        }
        Commands::Action(action) => {
            let Some((client, credentials)) = prepare(config) else {
                return 1;
            };
            interactive(&client, &credentials, action, &settings, cli.json).await
        }
    }
}

fn show_config(config: &SnapkeepConfig) -> u8 {
    match config.to_redacted_toml() {
        Ok(rendered) => {
            print!("{rendered}");
            0
        }
        Err(e) => {
            render_errors(&[e]);
            1
        }
    }
}

/// Builds the API client and login credentials, rendering every problem found.
fn prepare(config: &SnapkeepConfig) -> Option<(BaserowClient, Credentials)> {
    let client = connect(config);
    let credentials = config.credentials();
    match (client, credentials) {
        (Ok(client), Ok(credentials)) => Some((client, credentials)),
        (client, credentials) => {
            let mut errors = client.err().unwrap_or_default();
            errors.extend(credentials.err().unwrap_or_default());
            render_errors(&errors);
            None
        }
    }
}

fn connect(config: &SnapkeepConfig) -> Result<BaserowClient, Vec<ConfigError>> {
    let url = config.api_url().map_err(|e| vec![e])?;
    BaserowClient::new(url, Duration::from_secs(config.api.timeout_secs))
        .map_err(|e| vec![ConfigError::Other(e.to_string())])
}

/// Authenticates, runs one action and prints its result to stdout.
async fn interactive<B>(
    backend: &B,
    credentials: &Credentials,
    action: Action,
    settings: &Settings,
    as_json: bool,
) -> u8
where
    B: AuthProvider + SnapshotStore + JobStatusService + ?Sized,
{
    let token = match backend.authenticate(credentials).await {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "authentication failure, check credentials");
            eprintln!("snapkeep: {e}");
            return 1;
        }
    };
    if settings.dry_run {
        info!("dry run: no snapshot will be created or deleted");
    }

    match actions::execute(backend, &token, action, settings).await {
        Ok(result) => {
            let use_color = std::io::stdout().is_terminal();
            println!("{}", output::render(&result, as_json, use_color));
            0
        }
        Err(e) => {
            eprintln!("snapkeep: {e}");
            1
        }
    }
}

/// Logs go to stderr; stdout carries action results only.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("snapkeep={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
