//! In-memory [`PriceStore`] used by tests in place of a live Postgres. It
//! honors the same (route, recorded_at) uniqueness rule the real table
//! enforces.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::PriceStore;
use crate::models::{PriceHistoryEntry, Route};

#[derive(Default)]
pub struct MemoryStore {
    routes: Vec<Route>,
    history: Vec<PriceHistoryEntry>,
    seen: HashSet<(i64, DateTime<Utc>)>,
}

impl MemoryStore {
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes,
            ..Self::default()
        }
    }

    /// Pre-populates a history row, as if an earlier run had written it.
    pub fn seed_history(&mut self, entry: PriceHistoryEntry) {
        if self.seen.insert((entry.route_id, entry.recorded_at)) {
            self.history.push(entry);
        }
    }

    pub fn history(&self) -> &[PriceHistoryEntry] {
        &self.history
    }

    pub fn history_for(&self, route_id: i64) -> Vec<&PriceHistoryEntry> {
        self.history
            .iter()
            .filter(|entry| entry.route_id == route_id)
            .collect()
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn routes_with_prices(&mut self) -> Result<Vec<Route>> {
        Ok(self
            .routes
            .iter()
            .filter(|route| route.price.is_some() && route.departure_date.is_some())
            .cloned()
            .collect())
    }

    async fn has_history(&mut self, route_id: i64) -> Result<bool> {
        Ok(self.history.iter().any(|entry| entry.route_id == route_id))
    }

    async fn insert_history(&mut self, entries: &[PriceHistoryEntry]) -> Result<u64> {
        let mut inserted = 0;

        for entry in entries {
            if self.seen.insert((entry.route_id, entry.recorded_at)) {
                self.history.push(entry.clone());
                inserted += 1;
            }
        }

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn entry(route_id: i64, price: f64, day: u32) -> PriceHistoryEntry {
        PriceHistoryEntry {
            route_id,
            price,
            recorded_at: Utc.with_ymd_and_hms(2024, 5, day, 9, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn inserting_the_same_entries_twice_changes_nothing() {
        let mut store = MemoryStore::default();
        let entries = vec![entry(1, 500.0, 1), entry(1, 510.0, 2)];

        assert_eq!(store.insert_history(&entries).await.unwrap(), 2);
        assert_eq!(store.insert_history(&entries).await.unwrap(), 0);
        assert_eq!(store.history().len(), 2);
    }

    #[tokio::test]
    async fn first_entry_wins_on_duplicate_timestamps_within_one_batch() {
        let mut store = MemoryStore::default();
        let entries = vec![entry(1, 500.0, 1), entry(1, 999.0, 1)];

        assert_eq!(store.insert_history(&entries).await.unwrap(), 1);
        assert_eq!(store.history()[0].price, 500.0);
    }

    #[tokio::test]
    async fn routes_without_price_or_date_are_not_eligible() {
        let mut store = MemoryStore::new(vec![
            Route {
                id: 1,
                origin: "JFK".to_string(),
                destination: "LHR".to_string(),
                price: Some(500.0),
                departure_date: Some(chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
                created_at: None,
                updated_at: None,
            },
            Route {
                id: 2,
                origin: "SFO".to_string(),
                destination: "NRT".to_string(),
                price: None,
                departure_date: Some(chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
                created_at: None,
                updated_at: None,
            },
        ]);

        let eligible = store.routes_with_prices().await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, 1);
    }
}
