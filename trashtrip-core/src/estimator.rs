//! Projects how close a waste category is to its weekly recycling-trip threshold.

use crate::model::{TripEstimate, WasteCategory};

/// Planning horizon the remaining capacity is spread over.
pub const PLANNING_HORIZON_DAYS: f64 = 7.0;

/// Estimate trip readiness for `quantity_kg` of `category`.
///
/// Returns `None` for non-finite or non-positive quantities; callers treat that
/// as "no estimate" rather than an error.
#[must_use]
pub fn estimate(category: WasteCategory, quantity_kg: f64) -> Option<TripEstimate> {
    if !quantity_kg.is_finite() || quantity_kg <= 0.0 {
        return None;
    }

    let threshold = category.threshold_kg();
    let progress_percent = (quantity_kg / threshold * 100.0).min(100.0);

    let days_until_trip = if progress_percent >= 100.0 {
        0
    } else {
        days_to_fill((threshold - quantity_kg) / threshold)
    };

    Some(TripEstimate {
        progress_percent,
        days_until_trip,
    })
}

/// Project the remaining share of capacity linearly onto the planning horizon.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "remaining share is in (0, 1), so the ceiling is within 1..=7"
)]
fn days_to_fill(remaining_share: f64) -> u32 {
    (remaining_share * PLANNING_HORIZON_DAYS).ceil() as u32
}

/// Parse a user-entered quantity in kilograms.
#[must_use]
pub fn parse_quantity(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|quantity| quantity.is_finite() && *quantity > 0.0)
}
