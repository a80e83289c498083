//! Daily price-snapshot files and their per-route aggregation.
//!
//! Snapshots are written by the external price loader as
//! `prices_<YYYY-MM-DD>.json`, so a lexicographic sort of filenames is also
//! a date sort and the latest snapshot is simply the greatest name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPrice {
    pub origin: String,
    pub destination: String,
    /// ISO date or datetime string, as the loader records it.
    pub departure_date: String,
    pub price: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub timestamp: DateTime<Utc>,
    pub data: Vec<FlightPrice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPrice {
    pub date: String,
    pub price: f64,
}

pub fn snapshot_filename(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("prices_{}.json", date.format("%Y-%m-%d")))
}

pub fn save_snapshot(dir: &Path, prices: &[FlightPrice], now: DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let snapshot = PriceSnapshot {
        timestamp: now,
        data: prices.to_vec(),
    };

    let path = snapshot_filename(dir, now.date_naive());
    fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;

    Ok(path)
}

/// Loads the most recent snapshot, or `None` when the directory holds none.
pub fn load_latest_snapshot(dir: &Path) -> Result<Option<Vec<FlightPrice>>> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("prices_") && name.ends_with(".json"))
        .collect();
    names.sort();

    let Some(latest) = names.last() else {
        return Ok(None);
    };

    let content = fs::read_to_string(dir.join(latest))?;
    let snapshot: PriceSnapshot = serde_json::from_str(&content)?;

    Ok(Some(snapshot.data))
}

/// Groups observations by `origin-destination`, keeping at most one price
/// per calendar day (first seen wins), each group sorted by date ascending.
pub fn aggregate_prices(prices: &[FlightPrice]) -> BTreeMap<String, Vec<DailyPrice>> {
    let mut result: BTreeMap<String, Vec<DailyPrice>> = BTreeMap::new();

    for price in prices {
        let key = format!("{}-{}", price.origin, price.destination);
        // The date is the YYYY-MM-DD prefix of the ISO departure string.
        let date = price
            .departure_date
            .get(..10)
            .unwrap_or(&price.departure_date)
            .to_string();

        let days = result.entry(key).or_default();
        if !days.iter().any(|day| day.date == date) {
            days.push(DailyPrice {
                date,
                price: price.price,
            });
        }
    }

    for days in result.values_mut() {
        days.sort_by(|a, b| a.date.cmp(&b.date));
    }

    result
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::*;

    fn price(origin: &str, destination: &str, date: &str, price: f64) -> FlightPrice {
        FlightPrice {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date: date.to_string(),
            price,
            currency: "USD".to_string(),
            flight_number: None,
        }
    }

    #[test]
    fn first_price_wins_for_a_given_day() {
        let aggregated = aggregate_prices(&[
            price("JFK", "LHR", "2024-06-01T08:00:00Z", 480.0),
            price("JFK", "LHR", "2024-06-01T17:30:00Z", 520.0),
        ]);

        let days = &aggregated["JFK-LHR"];
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].price, 480.0);
    }

    #[test]
    fn days_within_a_route_are_sorted_ascending() {
        let aggregated = aggregate_prices(&[
            price("JFK", "LHR", "2024-06-03", 530.0),
            price("JFK", "LHR", "2024-06-01", 480.0),
            price("JFK", "LHR", "2024-06-02", 505.0),
        ]);

        let dates: Vec<&str> = aggregated["JFK-LHR"]
            .iter()
            .map(|day| day.date.as_str())
            .collect();
        assert_eq!(dates, ["2024-06-01", "2024-06-02", "2024-06-03"]);
    }

    #[test]
    fn routes_are_not_merged() {
        let aggregated = aggregate_prices(&[
            price("JFK", "LHR", "2024-06-01", 480.0),
            price("SFO", "NRT", "2024-06-01", 720.0),
        ]);

        assert_eq!(aggregated.len(), 2);
    }

    #[test]
    fn latest_snapshot_is_picked_by_filename() {
        let dir = tempdir().unwrap();

        save_snapshot(
            dir.path(),
            &[price("JFK", "LHR", "2024-06-01", 480.0)],
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();
        save_snapshot(
            dir.path(),
            &[price("JFK", "LHR", "2024-06-02", 505.0)],
            Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap(),
        )
        .unwrap();

        let latest = load_latest_snapshot(dir.path()).unwrap().unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].price, 505.0);
    }

    #[test]
    fn missing_directory_means_no_snapshot() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nowhere");

        assert!(load_latest_snapshot(&missing).unwrap().is_none());
    }
}
