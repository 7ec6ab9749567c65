//! Facility feed backed by the OpenStreetMap Overpass API, plus position sources.

/// Position sources: fixed coordinates, IP geolocation, and a consent gate.
pub mod position;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use trashtrip_core::{
    model::{FacilityCandidate, FacilityQuery, GeoPoint},
    ports::{FacilityPort, FeedError},
};

pub use position::{ConsentGate, FixedPosition, IpApiPosition};

/// Public Overpass interpreter endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Server-side query timeout passed to Overpass, in seconds.
const QUERY_TIMEOUT_SECS: u32 = 25;

/// OSM tag identifying recycling points.
const RECYCLING_TAG: (&str, &str) = ("amenity", "recycling");

/// Response from the interpreter in `[out:json]` mode.
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
    // set when the server aborted the query, e.g. on timeout or memory exhaustion
    #[serde(default)]
    remark: Option<String>,
}

/// Single node or way; ways carry their coordinates in `center` with `out center`.
#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type", default = "default_element_type")]
    kind: String,
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<Center>,
    #[serde(default)]
    tags: Tags,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

/// The handful of OSM tags we read; everything else is ignored.
#[derive(Debug, Default, Deserialize)]
struct Tags {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "addr:street", default)]
    street: Option<String>,
    #[serde(rename = "addr:housenumber", default)]
    house_number: Option<String>,
}

fn default_element_type() -> String {
    "node".to_owned()
}

impl Element {
    fn position(&self) -> Option<GeoPoint> {
        match (self.lat, self.lon, self.center.as_ref()) {
            (Some(lat), Some(lon), _) => Some(GeoPoint::new(lat, lon)),
            (_, _, Some(center)) => Some(GeoPoint::new(center.lat, center.lon)),
            _ => None,
        }
    }

    fn into_candidate(self, index: usize) -> Option<FacilityCandidate> {
        let position = self.position()?;
        if !position.latitude.is_finite() || !position.longitude.is_finite() {
            return None;
        }

        // node and way ids live in separate namespaces
        let id = match self.id {
            Some(id) => format!("{}/{id}", self.kind),
            None => format!("{}/#{index}", self.kind),
        };

        Some(FacilityCandidate {
            id,
            name: self.tags.name,
            street: self.tags.street,
            house_number: self.tags.house_number,
            position,
        })
    }
}

/// Facility feed querying an Overpass interpreter.
pub struct OverpassFacilityPort {
    client: Client,
    endpoint: String,
}

impl OverpassFacilityPort {
    /// Create a feed bound to the given HTTP client and interpreter endpoint.
    #[must_use]
    pub fn new<E: Into<String>>(client: Client, endpoint: E) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Create a feed against [`DEFAULT_ENDPOINT`].
    #[must_use]
    pub fn with_default_endpoint(client: Client) -> Self {
        Self::new(client, DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl FacilityPort for OverpassFacilityPort {
    fn name(&self) -> &str {
        "overpass"
    }

    async fn nearby(&self, query: &FacilityQuery) -> Result<Vec<FacilityCandidate>, FeedError> {
        let script = build_query(query);
        debug!(endpoint = %self.endpoint, radius_m = query.radius_m(), "sending overpass query");

        let req = self
            .client
            .post(&self.endpoint)
            .form(&[("data", script.as_str())]);

        let resp = fetch_json::<OverpassResponse>(req).await?;

        // an aborted query may still carry the elements found before the abort
        if let Some(remark) = resp.remark.filter(|remark| remark.contains("error")) {
            warn!(%remark, partial = resp.elements.len(), "overpass aborted the query");
            return Err(FeedError::Rejected(remark));
        }

        let total = resp.elements.len();
        let candidates = resp
            .elements
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| element.into_candidate(index))
            .collect::<Vec<_>>();

        if candidates.len() < total {
            debug!(skipped = total - candidates.len(), "ignored elements without coordinates");
        }

        Ok(candidates)
    }
}

/// Overpass QL selecting recycling nodes and ways around the query center.
#[must_use]
pub fn build_query(query: &FacilityQuery) -> String {
    let (key, value) = RECYCLING_TAG;
    let around = format!(
        "(around:{},{},{})",
        query.radius_m(),
        query.center.latitude,
        query.center.longitude
    );

    let statements = ["node", "way"]
        .map(|kind| format!("{kind}[\"{key}\"=\"{value}\"]{around};"))
        .concat();

    format!("[out:json][timeout:{QUERY_TIMEOUT_SECS}];({statements});out center;")
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, FeedError> {
    req.send()
        .await
        .map_err(FeedError::from)?
        .error_for_status()
        .map_err(FeedError::from)?
        .json()
        .await
        .map_err(|err| {
            if err.is_decode() {
                FeedError::Malformed(err.to_string())
            } else {
                FeedError::from(err)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_targets_recycling_nodes_and_ways() {
        let query = FacilityQuery::new(GeoPoint::new(27.7172, 85.324), 5.0);
        assert_eq!(
            build_query(&query),
            "[out:json][timeout:25];(\
             node[\"amenity\"=\"recycling\"](around:5000,27.7172,85.324);\
             way[\"amenity\"=\"recycling\"](around:5000,27.7172,85.324);\
             );out center;"
        );
    }

    #[test]
    fn ways_use_their_center() {
        let element = Element {
            kind: "way".to_owned(),
            id: Some(42),
            lat: None,
            lon: None,
            center: Some(Center {
                lat: 27.7,
                lon: 85.3,
            }),
            tags: Tags::default(),
        };
        let candidate = element.into_candidate(0).expect("has a center");
        assert_eq!(candidate.id, "way/42");
        assert_eq!(candidate.position, GeoPoint::new(27.7, 85.3));
    }

    #[test]
    fn elements_without_coordinates_are_dropped() {
        let element = Element {
            kind: "node".to_owned(),
            id: Some(7),
            lat: Some(27.7),
            lon: None,
            center: None,
            tags: Tags::default(),
        };
        assert!(element.into_candidate(0).is_none(), "partial coordinates accepted");
    }
}
