//! freqcache command line
//!
//! Replays operation logs against the LFU store, generates random logs and
//! compares snapshots.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use freqcache::oplog::{self, Operation};
use freqcache::snapshot;
use freqcache::store::CacheStore;
use freqcache::workload::{OperationGenerator, WorkloadConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "freqcache")]
#[command(about = "LFU cache log replay and snapshot tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an operation log and print the resulting snapshot
    Replay {
        /// Operation log to replay
        log: PathBuf,

        /// Maximum number of entries (zero or negative means unlimited)
        #[arg(short, long, allow_negative_numbers = true)]
        capacity: Option<i64>,

        /// Write the snapshot here instead of stdout
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Generate a random operation log
    Generate {
        /// Number of operations
        #[arg(short, long)]
        ops: usize,

        /// Number of distinct keys
        #[arg(short, long, default_value_t = 64)]
        keys: usize,

        /// RNG seed
        #[arg(short, long, default_value_t = 42)]
        seed: u64,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replay a log twice and check both runs end in the same state
    Verify {
        /// Operation log to replay
        log: PathBuf,

        /// Maximum number of entries (zero or negative means unlimited)
        #[arg(short, long, allow_negative_numbers = true)]
        capacity: Option<i64>,
    },

    /// Compare two snapshot files
    Compare {
        /// Expected snapshot
        left: PathBuf,

        /// Snapshot to check against it
        right: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            log,
            capacity,
            snapshot: out,
        } => {
            let ops = oplog::read_log(&log).context("Failed to read operation log")?;
            let store = run(&ops, capacity);
            match out {
                Some(path) => {
                    snapshot::write_snapshot(&path, &store).context("Failed to write snapshot")?;
                    info!(path = %path.display(), entries = store.len(), "snapshot written");
                },
                None => println!("{}", snapshot::render_store(&store)),
            }
        },

        Commands::Generate {
            ops,
            keys,
            seed,
            out,
        } => {
            let config = WorkloadConfig {
                seed,
                key_space: keys,
                ..WorkloadConfig::default()
            };
            let generated = OperationGenerator::new(config).generate(ops);
            match out {
                Some(path) => {
                    oplog::write_log(&path, &generated).context("Failed to write operation log")?;
                    info!(path = %path.display(), operations = generated.len(), "log generated");
                },
                None => print!("{}", oplog::render_log(&generated)),
            }
        },

        Commands::Verify { log, capacity } => {
            let ops = oplog::read_log(&log).context("Failed to read operation log")?;
            verify(&ops, capacity)?;
            info!(operations = ops.len(), "replay verified");
        },

        Commands::Compare { left, right } => compare_files(&left, &right)?,
    }

    Ok(())
}

/// Replays `ops` into two fresh stores and fails if their snapshots differ.
fn verify(ops: &[Operation], capacity: Option<i64>) -> Result<()> {
    let first = snapshot::render_store(&run(ops, capacity));
    let second = snapshot::render_store(&run(ops, capacity));
    let diff = snapshot::compare(&first, &second);
    if !diff.is_empty() {
        bail!("replay is not deterministic:\n{diff}");
    }
    Ok(())
}

fn compare_files(left: &Path, right: &Path) -> Result<()> {
    let diff = snapshot::compare(&read(left)?, &read(right)?);
    println!("{diff}");
    if !diff.is_empty() {
        bail!(
            "snapshots differ: {} and {}",
            left.display(),
            right.display()
        );
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    snapshot::read_snapshot(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Zero or negative capacities run unlimited.
fn capacity_from_arg(capacity: Option<i64>) -> Option<usize> {
    match capacity {
        Some(n) if n <= 0 => {
            warn!(capacity = n, "non-positive capacity, running unlimited");
            None
        },
        Some(n) => usize::try_from(n).ok(),
        None => None,
    }
}

fn run(ops: &[Operation], capacity: Option<i64>) -> CacheStore<String, String> {
    let mut store = CacheStore::new(capacity_from_arg(capacity));
    let stats = oplog::replay(&mut store, ops);
    info!(
        operations = stats.operations(),
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        entries = store.len(),
        "replay complete"
    );
    store
}
