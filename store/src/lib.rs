//! Shared data layer for the route price tracker.
//!
//! The `routes` table is owned by the search/ingestion flow and is read-only
//! here. This crate owns the `price_history` table: one row per route per
//! recorded timestamp, enforced by a uniqueness constraint so repeated
//! inserts are harmless.

use anyhow::Result;
use async_trait::async_trait;

pub mod memory;
pub mod models;
pub mod postgres;
pub mod snapshot;

use models::{PriceHistoryEntry, Route};

/// Store operations the backfill run needs, kept behind a trait so tests can
/// run against [`memory::MemoryStore`] instead of a live Postgres.
#[async_trait]
pub trait PriceStore: Send {
    /// Routes eligible for backfill: price and departure date both known.
    async fn routes_with_prices(&mut self) -> Result<Vec<Route>>;

    /// Whether any history rows exist for the route.
    async fn has_history(&mut self, route_id: i64) -> Result<bool>;

    /// Conflict-safe bulk insert. Entries whose (route, recorded_at) pair is
    /// already present are left untouched. Returns the number of rows
    /// actually written.
    async fn insert_history(&mut self, entries: &[PriceHistoryEntry]) -> Result<u64>;
}
