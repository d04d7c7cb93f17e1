//! CLI subcommand definitions and handlers.
//!
//! Uses clap derive to define the subcommand hierarchy:
//! - `console` (default) -- interactive admin/voter/results console
//! - `demo` -- scripted walk through one poll's lifecycle
//! - `config show|path|schema` -- inspect configuration
//! - `version` -- print build/version info

pub mod console;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::config::{self, Config, ConfigError};
use crate::polls::{NewPoll, PollError};
use crate::service::PollService;

/// Live poll engine with one active poll and timed voting windows.
#[derive(Parser, Debug)]
#[command(
    name = "pollcast",
    version = env!("CARGO_PKG_VERSION"),
    about = "pollcast: live polls with a single active poll and timed voting windows"
)]
pub struct Cli {
    /// Configuration file (default: $POLLCAST_CONFIG_PATH or the user config dir).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive console (default when no subcommand is given).
    Console,

    /// Run one poll through create, launch, votes and window expiry.
    Demo {
        /// Voting window for the demo poll, in seconds.
        #[arg(short, long, default_value_t = 30)]
        window: u32,
    },

    /// Inspect configuration.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print version, build date, and git commit information.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the loaded configuration as JSON.
    Show,

    /// Print the resolved configuration file path.
    Path,

    /// Print the configuration JSON schema.
    Schema,
}

// ---------------------------------------------------------------------------
// Subcommand handlers
// ---------------------------------------------------------------------------

/// Load configuration from the explicit path or the default location.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
}

/// Run the `config show` subcommand.
pub fn handle_config_show(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(cfg)?);
    Ok(())
}

/// Run the `config path` subcommand.
pub fn handle_config_path(explicit: Option<&Path>) {
    match explicit {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", config::get_config_path().display()),
    }
}

/// Run the `config schema` subcommand.
pub fn handle_config_schema() -> Result<(), Box<dyn std::error::Error>> {
    let schema = config::schema::generate_config_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Run the `version` subcommand.
pub fn handle_version() {
    println!("pollcast {}", env!("CARGO_PKG_VERSION"));
    println!("  Build date: {}", env!("POLLCAST_BUILD_DATE"));
    println!("  Git commit: {}", env!("POLLCAST_GIT_HASH"));
    println!(
        "  Platform:   {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
}

/// Run the `demo` subcommand.
///
/// Votes come from three scripted voters plus one repeat attempt; the window
/// is then run down with explicit ticks instead of waiting in real time.
pub async fn handle_demo(cfg: &Config, window: u32) -> Result<(), Box<dyn std::error::Error>> {
    let service = PollService::from_config(cfg);

    let poll = service
        .create_poll(
            NewPoll::new("Best season?")
                .with_options(["Summer", "Winter"])
                .with_window(window),
        )
        .await?;
    println!("created  {}", console::format_poll_line(&poll));

    let poll = service.launch(&poll.id)?;
    println!("launched {}", console::format_poll_line(&poll));

    for (option, voter) in [("Summer", "v1"), ("Winter", "v2"), ("Summer", "v3"), ("Winter", "v1")] {
        match service.cast_vote(&poll.id, option, voter).await {
            Ok(receipt) => println!(
                "vote     {voter} -> {option} ({} total)",
                receipt.total_votes
            ),
            Err(PollError::DuplicateVote { .. }) => {
                println!("vote     {voter} -> {option} rejected: already voted")
            }
            Err(e) => return Err(e.into()),
        }
    }

    let registry = service.registry();
    loop {
        let outcome = registry.tick(&poll.id)?;
        if outcome.closed {
            println!("closed   window of {window}s elapsed");
            break;
        }
    }

    if let Err(e) = service.cast_vote(&poll.id, "Winter", "v4").await {
        println!("vote     v4 -> Winter rejected: {e}");
    }

    let results = service
        .results(&poll.id)
        .ok_or_else(|| PollError::NotFound(poll.id.clone()))?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Run the interactive console until `quit`, end of input, or Ctrl-C.
pub async fn handle_console(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let service = PollService::from_config(cfg);
    let cancel = CancellationToken::new();
    let clock = service.spawn_clock(cfg.clock.tick_interval(), cancel.clone());

    println!("pollcast console. Type `help` for commands.");
    let result = tokio::select! {
        r = console::run(&service, tokio::io::stdin(), tokio::io::stdout()) => r,
        _ = tokio::signal::ctrl_c() => Ok(()),
    };

    cancel.cancel();
    let _ = clock.await;
    result
}
