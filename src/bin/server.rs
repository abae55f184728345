//! chirpstore Server Binary
//!
//! Bootstraps the record store and keeps it synced to disk.
//!
//! Reads admin commands from stdin, one per line:
//! - `status` — print store size and sync health
//! - `sync`   — persist immediately
//! - `quit`   — stop (end of input does the same)

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use chirpstore::{AppContext, Config, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// chirpstore Server
#[derive(Parser, Debug)]
#[command(name = "chirpstore-server")]
#[command(about = "Record store for a small social-post service")]
#[command(version)]
struct Args {
    /// Snapshot file [env: CHIRPSTORE_DB_PATH, default: ./data.json]
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Seconds between snapshots [env: CHIRPSTORE_SYNC_INTERVAL_SECS, default: 10]
    #[arg(short, long)]
    interval: Option<u64>,

    /// Write attempts per sync tick [env: CHIRPSTORE_SYNC_MAX_ATTEMPTS, default: 3]
    #[arg(short = 'a', long)]
    max_attempts: Option<u32>,

    /// Milliseconds before the first retry (doubles per attempt) [default: 200]
    #[arg(long)]
    backoff_ms: Option<u64>,

    /// Skip writes when nothing changed since the last snapshot
    #[arg(long)]
    skip_unchanged: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chirpstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("chirpstore Server v{}", chirpstore::VERSION);

    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Snapshot file: {}", config.snapshot_path.display());

    // Startup failure is fatal: there is no usable store without a snapshot.
    let context = match AppContext::start(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load store: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Store ready: {:?}", context.bootstrap_report());

    run_console(&context);

    match context.shutdown() {
        Ok(_) => tracing::info!("Server stopped"),
        Err(e) => {
            tracing::error!("Final sync failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Environment first, then whatever was given on the command line
fn build_config(args: &Args) -> Result<Config> {
    let mut builder = Config::from_env()?.into_builder();

    if let Some(db) = &args.db {
        builder = builder.snapshot_path(db);
    }
    if let Some(secs) = args.interval {
        builder = builder.sync_interval(Duration::from_secs(secs));
    }
    if let Some(attempts) = args.max_attempts {
        builder = builder.sync_max_attempts(attempts);
    }
    if let Some(ms) = args.backoff_ms {
        builder = builder.sync_initial_backoff(Duration::from_millis(ms));
    }
    if args.skip_unchanged {
        builder = builder.skip_unchanged(true);
    }

    builder.try_build()
}

/// Serve admin commands until `quit` or end of input
fn run_console(context: &AppContext) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("Failed to read admin input: {}", e);
                break;
            }
        };

        match line.trim() {
            "" => continue,
            "status" => {
                let store = context.store();
                let status = context.sync_status();
                println!(
                    "posts={} users={} healthy={} syncs={} failed_ticks={} last_error={}",
                    store.post_count(),
                    store.user_count(),
                    status.is_healthy(),
                    status.successful_syncs,
                    status.failed_ticks,
                    status.last_error.as_deref().unwrap_or("-")
                );
            }
            "sync" => match context.sync_now() {
                Ok(outcome) => println!("{:?}", outcome),
                Err(e) => println!("sync failed: {}", e),
            },
            "quit" | "exit" => break,
            other => println!("unknown command: {} (status, sync, quit)", other),
        }
    }
}
