//! Command-line entry point: migrate a store or generate a random one.

use clap::{Parser, Subcommand, ValueEnum};
use rehash::config::{GeneratorConfig, PipelineConfig};
use rehash::error::Result;
use rehash::generator::generate;
use rehash::pipeline::Pipeline;
use rehash::store::{dump_store, RocksStore};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Debug, Parser)]
#[command(name = "rehash", version, about = "Migrate a partitioned store, hashing every value")]
struct Cli {
    /// Minimum severity to log.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Error)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate a source store into a new store of value hashes.
    Migrate {
        /// Path of the source store.
        input: PathBuf,

        /// Path of the destination store.
        #[arg(long, default_value = "_storage.db")]
        output: PathBuf,

        /// Worker threads for reading and writing. Defaults to the number
        /// of CPUs.
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Create a store filled with random partitions and rows.
    Generate {
        /// Path of the store to create. Must not exist.
        path: PathBuf,

        /// RNG seed for a reproducible store.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from(cli.log_level).into())
                .from_env_lossy(),
        )
        .init();

    match cli.command {
        Command::Migrate {
            input,
            output,
            threads,
        } => migrate(input, output, threads),
        Command::Generate { path, seed } => generate_store(path, seed),
    }
}

fn migrate(input: PathBuf, output: PathBuf, threads: Option<usize>) -> Result<()> {
    let threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let config = PipelineConfig::new(input, output).with_threads(threads);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .max_blocking_threads(threads)
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let pipeline = Pipeline::open(&config)?;
        let stats = pipeline.run().await?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        pipeline.verify_dump(&mut out)?;
        out.flush()?;

        info!(
            partitions = stats.source_partitions,
            written = stats.records_written(),
            failures = stats.write_failures,
            skipped = stats.reserved_skipped,
            "migration complete"
        );

        pipeline.close();
        Ok(())
    })
}

fn generate_store(path: PathBuf, seed: Option<u64>) -> Result<()> {
    let store = RocksStore::create_new(&path)?;

    let config = match seed {
        Some(seed) => GeneratorConfig::default().with_seed(seed),
        None => GeneratorConfig::default(),
    };
    let summary = generate(&store, &config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dump_store(&store, &mut out)?;
    writeln!(out, "values: {}", summary.rows)?;
    writeln!(out, "partitions: {}", summary.partitions)?;
    out.flush()?;

    Ok(())
}
