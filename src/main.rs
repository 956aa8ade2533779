/// Main entry point for the NeuroHabit background worker
///
/// This binary opens the habit database and runs the periodic sweeps that
/// deliver reminders, streak milestone alerts, and weekly digests. It keeps
/// running until interrupted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use neurohabit::{HabitService, HabitStore, SweepConfig};

/// Pick a writable default location for the habit database
///
/// Probes a dot-directory under the home directory first, then the
/// platform data directory, then the working directory. The temp dir is
/// the last resort and gets a warning because it will not survive a
/// reboot on most systems.
fn default_database_path() -> std::io::Result<PathBuf> {
    let candidates = [
        dirs::home_dir().map(|p| p.join(".neurohabit")),
        dirs::data_dir().map(|p| p.join("neurohabit")),
        std::env::current_dir().ok().map(|p| p.join(".neurohabit")),
    ];

    for dir in candidates.into_iter().flatten() {
        if std::fs::create_dir_all(&dir).is_ok() && dir_is_writable(&dir) {
            return Ok(dir.join("habits.db"));
        }
    }

    let dir = std::env::temp_dir().join("neurohabit");
    std::fs::create_dir_all(&dir)?;
    warn!("Falling back to a temporary database at {}", dir.display());
    Ok(dir.join("habits.db"))
}

/// Whether a probe file can be written into the directory
fn dir_is_writable(dir: &Path) -> bool {
    let probe = dir.join(".write_probe");
    let writable = std::fs::write(&probe, b"ok").is_ok();
    if writable {
        let _ = std::fs::remove_file(&probe);
    }
    writable
}

/// Command line arguments for the NeuroHabit worker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Seconds between reminder sweeps
    #[arg(long, default_value_t = 60)]
    reminder_interval: u64,

    /// Seconds between streak alert sweeps
    #[arg(long, default_value_t = 60 * 60 * 24)]
    streak_alert_interval: u64,

    /// Seconds between digest sweeps
    #[arg(long, default_value_t = 60 * 60 * 24 * 7)]
    digest_interval: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("neurohabit={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting NeuroHabit worker");

    // Determine database path
    let db_path = match args.database {
        Some(path) => {
            // Validate and prepare the provided path
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let service = HabitService::new(db_path)?;

    // Test database connectivity before spawning anything
    let users = service.store().list_users()?;
    info!("Worker started successfully, found {} registered user(s)", users.len());

    let config = SweepConfig {
        reminder_interval: Duration::from_secs(args.reminder_interval),
        streak_alert_interval: Duration::from_secs(args.streak_alert_interval),
        digest_interval: Duration::from_secs(args.digest_interval),
    };
    let handles = service.spawn_sweeps(config);
    info!("Background sweeps running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down sweeps");
    for handle in &handles {
        handle.abort();
    }
    let _ = futures::future::join_all(handles).await;

    info!("NeuroHabit worker shutdown complete");
    Ok(())
}
