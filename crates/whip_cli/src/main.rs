//! whip CLI
//!
//! Fast IP range lookups from the command line.
//!
//! # Commands
//!
//! - `load` - Merge JSON-lines snapshots into a store
//! - `lookup` - Look up IP addresses
//! - `perftest` - Measure lookup throughput
//! - `inspect` - Display store statistics
//! - `verify` - Verify store integrity

mod commands;
mod reader;

use clap::{Parser, Subcommand};
use commands::lookup::Version;
use reader::RangeFields;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// whip command-line tools.
#[derive(Parser)]
#[command(name = "whip")]
#[command(author, version, about = "Fast IP geo lookup", long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, long, default_value = "db")]
    db: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load JSON-lines data files, one dated snapshot per file
    Load {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Field holding the first address of a range
        #[arg(long, default_value = "begin")]
        begin_field: String,

        /// Field holding the last address of a range
        #[arg(long, default_value = "end")]
        end_field: String,

        /// Records per atomic batch
        #[arg(long, default_value_t = whip_core::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Look up IP addresses
    Lookup {
        /// The IP address(es) to look up
        #[arg(required = true)]
        ips: Vec<String>,

        /// Show the version valid at this time, or "all" for every version
        #[arg(long, alias = "dt")]
        datetime: Option<String>,
    },

    /// Run a performance test
    Perftest {
        /// The number of random lookups
        #[arg(short = 'n', long, default_value_t = 100_000)]
        iterations: usize,

        /// File with one IP address per line to look up instead
        #[arg(long)]
        test_set: Option<PathBuf>,

        /// Version to resolve on every lookup
        #[arg(long, alias = "dt")]
        datetime: Option<String>,
    },

    /// Display store statistics
    Inspect {
        /// Show the latest record of the first range
        #[arg(short, long)]
        sample: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify store integrity
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Load {
            inputs,
            begin_field,
            end_field,
            batch_size,
        } => {
            let fields = RangeFields {
                begin: begin_field,
                end: end_field,
            };
            commands::load::run(&cli.db, &inputs, fields, batch_size)?;
        }
        Commands::Lookup { ips, datetime } => {
            let version = Version::from_arg(datetime.as_deref());
            commands::lookup::run(&cli.db, &ips, &version)?;
        }
        Commands::Perftest {
            iterations,
            test_set,
            datetime,
        } => {
            let version = Version::from_arg(datetime.as_deref());
            commands::perftest::run(&cli.db, iterations, test_set.as_deref(), &version)?;
        }
        Commands::Inspect { sample, format } => {
            commands::inspect::run(&cli.db, sample, &format)?;
        }
        Commands::Verify => {
            commands::verify::run(&cli.db)?;
        }
        Commands::Version => {
            println!("whip CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("whip core v{}", whip_core::VERSION);
        }
    }

    Ok(())
}
