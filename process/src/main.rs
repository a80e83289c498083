use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending SQL migrations in name order.
    Migrate {
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,
    },
    /// Generate synthetic price history for routes that have none.
    Backfill {
        /// Days of history per route.
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Aggregate the latest price snapshot into per-route daily series.
    Aggregate {
        #[arg(long, default_value = "data/snapshots")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Migrate { dir } => process::run_migrations(&dir).await,
        Command::Backfill { days } => process::run_backfill(days).await,
        Command::Aggregate { dir } => process::run_aggregate(&dir),
    }
}
