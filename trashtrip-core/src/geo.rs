//! Great-circle distance and distance ranking of facility candidates.

use crate::model::{FacilityCandidate, GeoPoint, RecyclingFacility, directions_url};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in degrees.
#[must_use]
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);
    // rounding can push the term a hair outside [0, 1] for antipodal points
    let half_chord = half_chord.clamp(0.0, 1.0);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());

    EARTH_RADIUS_KM * angle
}

/// Turn feed candidates into facilities ranked by distance from `origin`.
///
/// Equal distances keep the feed's relative order.
#[must_use]
pub fn rank_by_distance(origin: GeoPoint, candidates: Vec<FacilityCandidate>) -> Vec<RecyclingFacility> {
    let mut facilities = candidates
        .into_iter()
        .map(|candidate| {
            let name = candidate.display_name();
            let street_address = candidate.street_address();
            RecyclingFacility {
                distance_km: haversine_km(origin, candidate.position),
                directions_url: directions_url(candidate.position),
                id: candidate.id,
                name,
                position: candidate.position,
                street_address,
            }
        })
        .collect::<Vec<_>>();

    // sort_by is stable
    facilities.sort_by(|left, right| left.distance_km.total_cmp(&right.distance_km));
    facilities
}
