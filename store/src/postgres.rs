//! Postgres access: pool construction, the backfill session, and the
//! route-summary read.

use std::env;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    FromRow, PgPool, Postgres, QueryBuilder, Transaction, postgres::PgPoolOptions,
};

use crate::PriceStore;
use crate::models::{PriceHistoryEntry, PricePoint, Route, RouteSummary};

/// Upper bound on rows per INSERT statement. Bounds statement size only;
/// batch boundaries are not observable in the final state.
const INSERT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbConfig {
    /// Reads the `DB_*` variables, falling back to the local-dev defaults.
    pub fn from_env() -> Self {
        Self {
            host: env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("DB_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(5432),
            user: env::var("DB_USER").unwrap_or_else(|_| "routeuser".to_string()),
            password: env::var("DB_PASSWORD").unwrap_or_else(|_| "routepass".to_string()),
            database: env::var("DB_NAME").unwrap_or_else(|_| "routedb".to_string()),
        }
    }

    fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

pub async fn connect(config: &DbConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .idle_timeout(Duration::from_secs(30))
        .connect(&config.url())
        .await?;

    Ok(pool)
}

/// A backfill session. Every store call runs inside one transaction;
/// dropping the session without [`PgSession::commit`] rolls back everything
/// it wrote.
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

impl PgSession {
    pub async fn begin(pool: &PgPool) -> Result<Self> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl PriceStore for PgSession {
    async fn routes_with_prices(&mut self) -> Result<Vec<Route>> {
        let routes = sqlx::query_as::<_, Route>(
            "SELECT id, origin, destination, price, departure_date, created_at, updated_at \
             FROM routes \
             WHERE price IS NOT NULL AND departure_date IS NOT NULL",
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(routes)
    }

    async fn has_history(&mut self, route_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM price_history WHERE route_id = $1 LIMIT 1")
            .bind(route_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.is_some())
    }

    async fn insert_history(&mut self, entries: &[PriceHistoryEntry]) -> Result<u64> {
        let mut inserted = 0;

        for chunk in entries.chunks(INSERT_BATCH_SIZE) {
            let mut builder =
                QueryBuilder::new("INSERT INTO price_history (route_id, price, recorded_at) ");

            builder.push_values(chunk, |mut b, entry| {
                b.push_bind(entry.route_id)
                    .push_bind(entry.price)
                    .push_bind(entry.recorded_at);
            });

            builder.push(" ON CONFLICT (route_id, recorded_at) DO NOTHING");

            inserted += builder.build().execute(&mut *self.tx).await?.rows_affected();
        }

        Ok(inserted)
    }
}

#[derive(FromRow)]
struct SummaryRow {
    route_id: i64,
    origin: String,
    destination: String,
    price: Option<f64>,
    recorded_at: Option<DateTime<Utc>>,
}

/// Every route with its complete history, oldest first. Routes with no
/// history rows still appear, with an empty price list.
pub async fn route_summaries(pool: &PgPool) -> Result<Vec<RouteSummary>> {
    let rows = sqlx::query_as::<_, SummaryRow>(
        "SELECT r.id AS route_id, r.origin, r.destination, p.price, p.recorded_at \
         FROM routes r \
         LEFT JOIN price_history p ON p.route_id = r.id \
         ORDER BY r.origin, r.destination, r.id, p.recorded_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(fold_summary_rows(rows))
}

fn fold_summary_rows(rows: Vec<SummaryRow>) -> Vec<RouteSummary> {
    let mut summaries: Vec<RouteSummary> = Vec::new();

    for row in rows {
        if summaries.last().map(|summary| summary.route_id) != Some(row.route_id) {
            summaries.push(RouteSummary {
                route_id: row.route_id,
                origin: row.origin,
                destination: row.destination,
                prices: Vec::new(),
            });
        }

        if let (Some(price), Some(recorded_at), Some(summary)) =
            (row.price, row.recorded_at, summaries.last_mut())
        {
            summary.prices.push(PricePoint { price, recorded_at });
        }
    }

    summaries
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn row(
        route_id: i64,
        origin: &str,
        destination: &str,
        point: Option<(f64, i64)>,
    ) -> SummaryRow {
        SummaryRow {
            route_id,
            origin: origin.to_string(),
            destination: destination.to_string(),
            price: point.map(|(price, _)| price),
            recorded_at: point.map(|(_, day)| Utc.with_ymd_and_hms(2024, 3, day as u32, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn routes_without_history_keep_an_empty_price_list() {
        let summaries = fold_summary_rows(vec![
            row(1, "JFK", "LHR", Some((512.0, 1))),
            row(1, "JFK", "LHR", Some((498.5, 2))),
            row(2, "SFO", "NRT", None),
        ]);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].prices.len(), 2);
        assert_eq!(summaries[1].route_id, 2);
        assert!(summaries[1].prices.is_empty());
    }

    #[test]
    fn adjacent_routes_with_same_airports_stay_separate() {
        let summaries = fold_summary_rows(vec![
            row(1, "JFK", "LHR", Some((512.0, 1))),
            row(2, "JFK", "LHR", Some((305.0, 1))),
        ]);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].prices[0].price, 512.0);
        assert_eq!(summaries[1].prices[0].price, 305.0);
    }
}
