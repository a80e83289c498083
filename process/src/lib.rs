//! # Batch jobs
//!
//! One-off maintenance commands for the route price tracker.
//!
//! ## Backfill
//!
//! Routes arrive from the search flow with a current price but no history,
//! which leaves the price chart empty. The backfill synthesizes a daily
//! series per route so the chart has something to show until real
//! observations accumulate:
//!
//! 1. Select every route with a known price and departure date.
//! 2. Skip routes that already have any history row. All-or-nothing per
//!    route: a route is never partially supplemented.
//! 3. Generate one entry per day walking back from the route's last-updated
//!    time, and bulk-insert with a conflict-safe upsert.
//!
//! The whole run executes inside a single transaction. A failure anywhere
//! rolls back every write of the run and the process exits non-zero.
//! Nothing guards two simultaneous backfills against racing on the same
//! routes; runs are expected to be one at a time.
//!
//! ## Migrate
//!
//! Applies the `.sql` files in `migrations/` in name order, tracked in a
//! `migrations` table.
//!
//! ## Aggregate
//!
//! Reads the newest `prices_<date>.json` snapshot and writes the per-route
//! daily aggregation next to it for the frontend to pick up.

use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};

pub mod generate;
pub mod migrate;

use generate::generate_price_history;
use store::{
    PriceStore,
    models::PriceHistoryEntry,
    postgres::{self, DbConfig, PgSession},
    snapshot,
};

/// Routes per progress group. Grouping bounds progress messages only; all
/// writes still land in one transaction.
const ROUTE_GROUP_SIZE: usize = 100;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub routes_processed: usize,
    pub routes_skipped: usize,
    pub entries_inserted: u64,
}

pub async fn run_backfill(days: u32) -> Result<()> {
    let pool = postgres::connect(&DbConfig::from_env()).await?;

    println!("Starting price history backfill...");

    let mut session = PgSession::begin(&pool).await?;
    let report = backfill_history(&mut session, days, Utc::now()).await?;
    session.commit().await?;

    println!(
        "Backfilled {} entries across {} routes ({} skipped)",
        report.entries_inserted, report.routes_processed, report.routes_skipped
    );

    Ok(())
}

/// Runs the whole backfill against one store session. The caller owns the
/// transaction: on error the session must be discarded without commit.
pub async fn backfill_history<S: PriceStore>(
    store: &mut S,
    days: u32,
    now: DateTime<Utc>,
) -> Result<BackfillReport> {
    let routes = store.routes_with_prices().await?;

    println!("Found {} valid routes to process", routes.len());

    let pb = ProgressBar::new(routes.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap()
        .progress_chars("=> "),
    );

    let groups = routes.len().div_ceil(ROUTE_GROUP_SIZE);
    let mut rng = rand::thread_rng();
    let mut report = BackfillReport::default();

    for (group, chunk) in routes.chunks(ROUTE_GROUP_SIZE).enumerate() {
        pb.set_message(format!("group {}/{groups}", group + 1));

        let mut queued: Vec<PriceHistoryEntry> = Vec::new();

        for route in chunk {
            if store.has_history(route.id).await? {
                report.routes_skipped += 1;
                pb.inc(1);
                continue;
            }

            queued.extend(generate_price_history(
                route,
                route.history_anchor(now),
                days,
                &mut rng,
            ));
            report.routes_processed += 1;
            pb.inc(1);
        }

        if !queued.is_empty() {
            report.entries_inserted += store.insert_history(&queued).await?;
        }
    }

    pb.finish_with_message("Done");

    Ok(report)
}

pub async fn run_migrations(dir: &Path) -> Result<()> {
    let pool = postgres::connect(&DbConfig::from_env()).await?;

    migrate::apply_migrations(&pool, dir).await
}

pub fn run_aggregate(dir: &Path) -> Result<()> {
    let Some(prices) = snapshot::load_latest_snapshot(dir)? else {
        println!("No snapshots found in {}", dir.display());
        return Ok(());
    };

    let aggregated = snapshot::aggregate_prices(&prices);

    let path = dir.join("aggregated_prices.json");
    fs::write(&path, serde_json::to_string_pretty(&aggregated)?)?;

    println!("Aggregated {} route(s) into {}", aggregated.len(), path.display());

    Ok(())
}
