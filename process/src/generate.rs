use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use store::models::{PriceHistoryEntry, Route};

/// One synthetic entry per calendar day, walking back from `end` inclusive,
/// returned oldest first. Each price is the route's current price scaled by
/// a uniform factor in [0.9, 1.1] and rounded to cents. Routes without a
/// usable price yield nothing.
///
/// The random source is a parameter so tests can pin it to a seed.
pub fn generate_price_history(
    route: &Route,
    end: DateTime<Utc>,
    days: u32,
    rng: &mut impl Rng,
) -> Vec<PriceHistoryEntry> {
    let Some(base) = route.price.filter(|price| price.is_finite()) else {
        return Vec::new();
    };

    (0..days)
        .map(|i| {
            let factor = rng.gen_range(0.9..=1.1);

            PriceHistoryEntry {
                route_id: route.id,
                price: (base * factor * 100.0).round() / 100.0,
                recorded_at: end - Duration::days(i64::from(days - 1 - i)),
            }
        })
        .collect()
}
