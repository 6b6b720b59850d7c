//! push-state: run a gregor state through the badge pipeline
//!
//! Reads a gregor state as JSON, wraps it in a `gregor:pushState` action,
//! prints the action envelope, then feeds it to a badger and prints the
//! badge notification it publishes.
//!
//! # Usage
//!
//! ```sh
//! # From a file
//! cargo run -p push-state -- --state state.json --reason reconnected
//!
//! # From stdin, with dispatch logging
//! cat state.json | cargo run -p push-state -- --state - --verbose
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gregor_badges::{
    create_push_state, BadgeStateArg, BadgeStateSnapshot, Badger, BadgerConfig, GregorState,
    PushReason, PushStatePayload, NOTIFY_BADGE_STATE_METHOD,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Push a gregor state and print the resulting badges
#[derive(Parser, Debug)]
#[command(name = "push-state")]
#[command(about = "Feed a gregor state through the push-state action pipeline")]
struct Args {
    /// Gregor state JSON file, `-` for stdin
    #[arg(long, short, default_value = "-")]
    state: String,

    /// Push reason: none, reconnected or new_data
    #[arg(long, short, default_value = "new_data")]
    reason: PushReason,

    /// Badger config JSON file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Action tags to log (comma-separated globs, e.g. "gregor:*")
    #[arg(long)]
    log_include: Option<String>,

    /// Action tags to skip in the log
    #[arg(long)]
    log_exclude: Option<String>,

    /// Debug logging on stderr (overridden by RUST_LOG)
    #[arg(long, short)]
    verbose: bool,
}

/// stderr, compact; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn read_state(source: &str) -> Result<GregorState> {
    let json = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading gregor state from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading {source}"))?
    };
    serde_json::from_str(&json).context("parsing gregor state")
}

fn load_config(args: &Args) -> Result<BadgerConfig> {
    let mut config = match &args.config {
        Some(path) => BadgerConfig::from_file(path)?,
        None => BadgerConfig::default(),
    };
    if args.log_include.is_some() {
        config.log_include = args.log_include.clone();
    }
    if args.log_exclude.is_some() {
        config.log_exclude = args.log_exclude.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    let state = read_state(&args.state)?;
    info!(items = state.len(), reason = %args.reason, "gregor state loaded");

    let action = create_push_state(PushStatePayload::new(state, args.reason));
    println!("{}", serde_json::to_string_pretty(&action.to_envelope())?);

    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<BadgeStateSnapshot>();
    let badger = Badger::new(&config, notify_tx);
    let sender = badger.sender();
    let task = tokio::spawn(badger.run(CancellationToken::new()));

    sender.send(action.into())?;
    drop(sender);
    let final_state = task.await.context("badger task failed")?;

    let badge_state = match notify_rx.recv().await {
        Some(snapshot) => snapshot,
        None => {
            info!("badge state unchanged, nothing published");
            final_state.export()
        }
    };
    let params = BadgeStateArg { badge_state };
    let notification = serde_json::json!({
        "method": NOTIFY_BADGE_STATE_METHOD,
        "params": params,
    });
    println!("{}", serde_json::to_string_pretty(&notification)?);

    Ok(())
}
