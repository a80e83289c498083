use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A tracked flight route. Created by the search flow, never written here.
#[derive(Debug, Clone, FromRow)]
pub struct Route {
    pub id: i64,
    pub origin: String,
    pub destination: String,
    pub price: Option<f64>,
    pub departure_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Route {
    /// Reference timestamp for generated history: last update, else
    /// creation, else `now`.
    pub fn history_anchor(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.updated_at.or(self.created_at).unwrap_or(now)
    }
}

/// One observed (or synthesized) price for a route at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistoryEntry {
    pub route_id: i64,
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricePoint {
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A route with its full price history, oldest first. Built fresh per
/// request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub route_id: i64,
    pub origin: String,
    pub destination: String,
    pub prices: Vec<PricePoint>,
}
