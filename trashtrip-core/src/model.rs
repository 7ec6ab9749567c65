//! Domain data structures for waste categories, trip estimates, and recycling facilities.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Display name used when the facility feed supplies none.
pub const DEFAULT_FACILITY_NAME: &str = "Recycling Center";

/// Search radius used when the caller does not pick one.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Waste categories the trip planner knows a weekly capacity for.
pub enum WasteCategory {
    /// Plastic bottles and packaging.
    Plastic,
    /// Glass bottles and jars.
    Glass,
    /// Paper and cardboard.
    Paper,
    /// Cans and metal scrap.
    Metal,
    /// Electronic waste.
    EWaste,
    /// Food and garden waste.
    Organic,
    /// Unsorted mixed waste.
    Mixed,
}

impl WasteCategory {
    /// Every category in the order the planner lists them.
    pub const ALL: [WasteCategory; 7] = [
        WasteCategory::Plastic,
        WasteCategory::Glass,
        WasteCategory::Paper,
        WasteCategory::Metal,
        WasteCategory::EWaste,
        WasteCategory::Organic,
        WasteCategory::Mixed,
    ];

    /// Weekly accumulation threshold in kilograms that makes a trip worthwhile.
    #[must_use]
    pub fn threshold_kg(self) -> f64 {
        match self {
            WasteCategory::Plastic => 5.0,
            WasteCategory::Glass => 3.0,
            WasteCategory::Paper => 8.0,
            WasteCategory::Metal => 4.0,
            WasteCategory::EWaste => 2.0,
            WasteCategory::Organic => 10.0,
            WasteCategory::Mixed => 6.0,
        }
    }

    /// Human-friendly label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WasteCategory::Plastic => "Plastic",
            WasteCategory::Glass => "Glass",
            WasteCategory::Paper => "Paper/Cardboard",
            WasteCategory::Metal => "Metal",
            WasteCategory::EWaste => "E-waste",
            WasteCategory::Organic => "Organic",
            WasteCategory::Mixed => "Mixed",
        }
    }

    /// Stable lowercase identifier, also accepted by [`FromStr`].
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            WasteCategory::Plastic => "plastic",
            WasteCategory::Glass => "glass",
            WasteCategory::Paper => "paper",
            WasteCategory::Metal => "metal",
            WasteCategory::EWaste => "e-waste",
            WasteCategory::Organic => "organic",
            WasteCategory::Mixed => "mixed",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.slug())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown waste category: {0}")]
/// Raised when a category identifier is not one of [`WasteCategory::ALL`].
pub struct UnknownCategory(pub String);

impl FromStr for WasteCategory {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim().to_lowercase();
        WasteCategory::ALL
            .into_iter()
            .find(|category| category.slug() == needle)
            .ok_or_else(|| UnknownCategory(raw.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Projected trip readiness for one category and quantity.
pub struct TripEstimate {
    /// Share of the weekly threshold already collected, clamped to `0..=100`.
    pub progress_percent: f64,
    /// Whole days until the threshold is expected to be reached.
    pub days_until_trip: u32,
}

impl TripEstimate {
    /// Whether the threshold has been reached.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.days_until_trip == 0
    }

    /// Progress as a whole percent for display.
    ///
    /// Only a ready estimate reports 100; anything short of the threshold is
    /// floored so the gauge never claims completion early.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is clamped to 0..=99"
    )]
    pub fn rounded_percent(&self) -> u8 {
        if self.is_ready() {
            return 100;
        }
        self.progress_percent.floor().clamp(0.0, 99.0) as u8
    }

    /// Short recommendation line.
    #[must_use]
    pub fn headline(&self) -> String {
        if self.is_ready() {
            "Time to recycle!".to_owned()
        } else {
            format!("Recycle in ~{} days", self.days_until_trip)
        }
    }

    /// Calendar date of the projected trip, counted from `today`.
    #[must_use]
    pub fn trip_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(u64::from(self.days_until_trip)))
            .unwrap_or(NaiveDate::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// WGS84 coordinate in degrees.
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Construct a point from latitude and longitude in degrees.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates are finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Parameters for one facility feed request.
pub struct FacilityQuery {
    /// Center of the search.
    pub center: GeoPoint,
    /// Search radius in kilometres.
    pub radius_km: f64,
}

impl FacilityQuery {
    /// Construct a query around `center`.
    #[must_use]
    pub fn new(center: GeoPoint, radius_km: f64) -> Self {
        Self { center, radius_km }
    }

    /// Radius in whole metres, as most point-of-interest APIs expect.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "radius is clamped to a non-negative range well below u32::MAX"
    )]
    pub fn radius_m(&self) -> u32 {
        (self.radius_km * 1000.0).round().clamp(0.0, 1.0e9) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Raw facility as reported by a feed, before distance ranking.
pub struct FacilityCandidate {
    /// Feed identifier, unique within one response.
    pub id: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional street name tag.
    pub street: Option<String>,
    /// Optional house number tag.
    pub house_number: Option<String>,
    /// Facility location.
    pub position: GeoPoint,
}

impl FacilityCandidate {
    /// Street address, only when both the street and the house number are known.
    #[must_use]
    pub fn street_address(&self) -> Option<String> {
        let street = self.street.as_deref().map(str::trim).filter(|part| !part.is_empty())?;
        let number = self
            .house_number
            .as_deref()
            .map(str::trim)
            .filter(|part| !part.is_empty())?;
        Some(format!("{street} {number}"))
    }

    /// Display name, falling back to [`DEFAULT_FACILITY_NAME`].
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FACILITY_NAME)
            .to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Recycling facility ranked relative to one user position.
pub struct RecyclingFacility {
    /// Feed identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Facility location.
    pub position: GeoPoint,
    /// Street and house number, if both are known.
    pub street_address: Option<String>,
    /// Great-circle distance from the position the lookup ran for.
    pub distance_km: f64,
    /// Turn-by-turn directions link to the facility.
    pub directions_url: String,
}

/// Build an outbound directions link for a destination.
#[must_use]
pub fn directions_url(destination: GeoPoint) -> String {
    format!(
        "{DIRECTIONS_BASE_URL}&destination={},{}",
        destination.latitude, destination.longitude
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: Option<&str>, street: Option<&str>, number: Option<&str>) -> FacilityCandidate {
        FacilityCandidate {
            id: "node/1".to_owned(),
            name: name.map(str::to_owned),
            street: street.map(str::to_owned),
            house_number: number.map(str::to_owned),
            position: GeoPoint::new(27.72, 85.328),
        }
    }

    #[test]
    fn every_threshold_is_positive() {
        for category in WasteCategory::ALL {
            assert!(category.threshold_kg() > 0.0, "{category} has no capacity");
        }
    }

    #[test]
    fn categories_parse_from_their_slug() {
        for category in WasteCategory::ALL {
            assert_eq!(category.slug().parse::<WasteCategory>(), Ok(category));
        }
        assert_eq!(" E-Waste ".parse::<WasteCategory>(), Ok(WasteCategory::EWaste));
        assert_eq!(
            "styrofoam".parse::<WasteCategory>(),
            Err(UnknownCategory("styrofoam".to_owned()))
        );
    }

    #[test]
    fn address_requires_street_and_number() {
        assert_eq!(
            candidate(None, Some("Thamel Marg"), Some("12")).street_address(),
            Some("Thamel Marg 12".to_owned())
        );
        assert_eq!(candidate(None, Some("Thamel Marg"), None).street_address(), None);
        assert_eq!(candidate(None, None, Some("12")).street_address(), None);
        assert_eq!(candidate(None, Some("  "), Some("12")).street_address(), None);
    }

    #[test]
    fn missing_name_falls_back_to_generic_label() {
        assert_eq!(candidate(None, None, None).display_name(), DEFAULT_FACILITY_NAME);
        assert_eq!(candidate(Some(""), None, None).display_name(), DEFAULT_FACILITY_NAME);
        assert_eq!(candidate(Some("Doko Recyclers"), None, None).display_name(), "Doko Recyclers");
    }

    #[test]
    fn directions_link_carries_destination_only() {
        assert_eq!(
            directions_url(GeoPoint::new(27.7, 85.3)),
            "https://www.google.com/maps/dir/?api=1&destination=27.7,85.3"
        );
    }

    #[test]
    fn trip_date_counts_days_from_today() {
        let estimate = TripEstimate {
            progress_percent: 50.0,
            days_until_trip: 4,
        };
        let today = NaiveDate::from_ymd_opt(2024, 12, 30).expect("valid date");
        assert_eq!(
            estimate.trip_date(today),
            NaiveDate::from_ymd_opt(2025, 1, 3).expect("valid date")
        );
        assert_eq!(estimate.headline(), "Recycle in ~4 days");
        assert_eq!(estimate.rounded_percent(), 50);
    }

    #[test]
    fn nearly_full_estimate_does_not_show_complete() {
        let estimate = TripEstimate {
            progress_percent: 99.8,
            days_until_trip: 1,
        };
        assert!(!estimate.is_ready(), "one day left");
        assert_eq!(estimate.rounded_percent(), 99);
        assert_eq!(estimate.headline(), "Recycle in ~1 days");

        let ready = TripEstimate {
            progress_percent: 100.0,
            days_until_trip: 0,
        };
        assert_eq!(ready.rounded_percent(), 100);
    }

    #[test]
    fn coordinates_must_be_finite_and_in_range() {
        assert!(GeoPoint::new(27.7172, 85.324).is_valid(), "Kathmandu");
        assert!(GeoPoint::new(-90.0, 180.0).is_valid(), "range bounds are inclusive");
        assert!(!GeoPoint::new(f64::NAN, 85.3).is_valid(), "NaN latitude");
        assert!(!GeoPoint::new(27.7, f64::INFINITY).is_valid(), "infinite longitude");
        assert!(!GeoPoint::new(90.5, 0.0).is_valid(), "latitude past the pole");
        assert!(!GeoPoint::new(0.0, 400.0).is_valid(), "longitude out of range");
    }

    #[test]
    fn radius_is_converted_to_metres() {
        let query = FacilityQuery::new(GeoPoint::new(0.0, 0.0), DEFAULT_RADIUS_KM);
        assert_eq!(query.radius_m(), 5000);
    }
}
