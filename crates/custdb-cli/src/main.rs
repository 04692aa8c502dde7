//! custdb CLI
//!
//! Builds the partition store and value index from a full-data file and
//! resolves field-equality queries against them.
//!
//! ## Usage
//!
//! ```bash
//! custdb partition customers.feather
//! custdb index customers.feather --fields name,gender
//! custdb query -f name=alice -f gender=f
//! custdb explain -f occupation=engineer
//! custdb --config /etc/custdb.yml --data-dir /srv/buckets query -f customer_id=cka2501
//! custdb generate-config
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use custdb_cli::{commands, parse_filter, CustdbConfig, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "custdb")]
#[command(author, version, about = "Partitioned customer record store with value indexes")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to custdb.yml config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Partition store directory (overrides config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Index directory (overrides config file)
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a full-data file into hash partitions
    Partition {
        /// Path to the source file (Arrow IPC / Feather)
        source: PathBuf,
    },

    /// Build or extend the value index from a full-data file
    Index {
        /// Path to the source file (Arrow IPC / Feather)
        source: PathBuf,

        /// Fields to index (comma-separated, default: index.fields from config)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Resolve filters and print matching records as JSON
    Query {
        /// Filter as field=value (repeatable)
        #[arg(short, long = "filter", required = true)]
        filters: Vec<String>,
    },

    /// Show how filters would be resolved without loading data
    Explain {
        /// Filter as field=value (repeatable)
        #[arg(short, long = "filter", required = true)]
        filters: Vec<String>,
    },

    /// Write the default configuration to a file
    GenerateConfig {
        /// Output path
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}

fn init_logging(config: &CustdbConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level().to_string())),
        )
        .with_target(config.logging.show_target)
        .with_thread_ids(config.logging.show_thread_ids)
        .with_file(config.logging.show_location)
        .with_line_number(config.logging.show_location)
        .with_writer(std::io::stderr)
        .init();
}

fn generate_config(path: &Path) -> Result<()> {
    CustdbConfig::write_default(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Generated default configuration: {}", path.display());
    Ok(())
}

fn parse_filters(args: &[String]) -> Result<Vec<(String, String)>> {
    args.iter().map(|arg| parse_filter(arg)).collect()
}

/// Load the config file, apply overrides, then set up logging and the thread pool
fn setup(args: &GlobalArgs) -> Result<CustdbConfig> {
    let mut config = CustdbConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    // Apply command line overrides
    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(index_dir) = &args.index_dir {
        config.index.index_dir = index_dir.clone();
    }

    init_logging(&config);
    debug!("Configuration: {:?}", config);

    if let Some(threads) = config.parallel.explicit_thread_pool_size() {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
        debug!("Thread pool size: {}", threads);
    }

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Does not read the config file, so a broken one can be replaced
        Commands::GenerateConfig { path } => generate_config(&path)?,
        Commands::Partition { source } => {
            let config = setup(&cli.global)?;
            let summary = commands::partition(&config, &source)?;
            println!(
                "Wrote {} records into {} partitions under {}",
                summary.records_written,
                summary.partitions_written,
                config.storage.data_dir.display()
            );
        }
        Commands::Index { source, fields } => {
            let config = setup(&cli.global)?;
            let summary = commands::index(&config, &source, &fields)?;
            if !summary.fields_skipped.is_empty() {
                info!("Skipped unknown fields: {:?}", summary.fields_skipped);
            }
            println!(
                "Indexed {} fields: {} values, {} entries written under {}",
                summary.fields_indexed.len(),
                summary.values_seen,
                summary.entries_written,
                config.index.index_dir.display()
            );
        }
        Commands::Query { filters } => {
            let config = setup(&cli.global)?;
            let records = commands::query(&config, &parse_filters(&filters)?)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Explain { filters } => {
            let config = setup(&cli.global)?;
            let explain = commands::explain(&config, &parse_filters(&filters)?)?;
            println!("{}", serde_json::to_string_pretty(&explain)?);
        }
    }

    Ok(())
}
