mod scan;

use clap::{Parser, Subcommand};
use mcscout_core::{AcquisitionRequest, EntityType};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mcscout")]
#[command(about = "Scan FMCSA carrier snapshots by MC number")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check a range of MC numbers, printing one line per number.
    ///
    /// Without `--end` the scan runs until interrupted with Ctrl-C.
    Scan {
        /// First MC number to check.
        #[arg(long)]
        start: u64,
        /// Last MC number to check, inclusive.
        #[arg(long)]
        end: Option<u64>,
        /// Keep only records of this entity type (carrier, broker, shipper).
        #[arg(long, default_value = "carrier", env = "MCSCOUT_ENTITY_TYPE")]
        entity_type: EntityType,
        /// Write accepted records to stdout as JSON lines instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Look up a single MC number and print the record.
    Lookup {
        mc: u64,
        #[arg(long, default_value = "carrier", env = "MCSCOUT_ENTITY_TYPE")]
        entity_type: EntityType,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = mcscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scan {
            start,
            end,
            entity_type,
            json,
        }) => {
            let request = AcquisitionRequest::new(start, end, entity_type)?;
            scan::run_scan(config, request, json).await?;
        }
        Some(Commands::Lookup { mc, entity_type }) => {
            scan::run_lookup(&config, mc, entity_type).await?;
        }
        None => println!("no command given; try `mcscout scan --start <MC>`"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
