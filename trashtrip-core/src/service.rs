//! High-level locator facade combining a position source and a facility feed.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::geo::rank_by_distance;
use crate::model::{DEFAULT_RADIUS_KM, FacilityQuery, RecyclingFacility};
use crate::ports::{FacilityPort, LocateError, PositionPort};

/// Upper bound for resolving the device position.
pub const DEFAULT_POSITION_TIMEOUT: Duration = Duration::from_secs(10);

/// Public entry point for finding nearby recycling facilities.
pub struct LocatorService {
    position_port: Arc<dyn PositionPort>,
    facility_port: Arc<dyn FacilityPort>,
    position_timeout: Duration,
}

impl LocatorService {
    /// Create a new service bound to a position source and a facility feed.
    #[must_use]
    pub fn new(position_port: Arc<dyn PositionPort>, facility_port: Arc<dyn FacilityPort>) -> Self {
        Self {
            position_port,
            facility_port,
            position_timeout: DEFAULT_POSITION_TIMEOUT,
        }
    }

    /// Override how long the position lookup may take.
    #[must_use]
    pub fn with_position_timeout(mut self, timeout: Duration) -> Self {
        self.position_timeout = timeout;
        self
    }

    /// Find recycling facilities within `radius_km` of the current position,
    /// closest first.
    ///
    /// Non-finite or non-positive radii fall back to [`DEFAULT_RADIUS_KM`]. An empty
    /// list means nothing was found and is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`LocateError`] when the position cannot be resolved, is not a
    /// real coordinate, or the feed request fails. Nothing is retried.
    pub async fn locate(&self, radius_km: f64) -> Result<Vec<RecyclingFacility>, LocateError> {
        let radius_km = if radius_km.is_finite() && radius_km > 0.0 {
            radius_km
        } else {
            DEFAULT_RADIUS_KM
        };

        let position =
            match tokio::time::timeout(self.position_timeout, self.position_port.current_position()).await {
                Ok(Ok(position)) => position,
                Ok(Err(err)) => {
                    warn!(error = %err, "position lookup failed");
                    return Err(err.into());
                }
                Err(_elapsed) => {
                    warn!(timeout = ?self.position_timeout, "position lookup timed out");
                    return Err(LocateError::LocationUnavailable(format!(
                        "no position within {}s",
                        self.position_timeout.as_secs_f64()
                    )));
                }
            };

        if !position.is_valid() {
            warn!(%position, "position lookup returned invalid coordinates");
            return Err(LocateError::LocationUnavailable(format!(
                "invalid coordinates {position}"
            )));
        }

        let query = FacilityQuery::new(position, radius_km);
        debug!(feed = self.facility_port.name(), center = %position, radius_km, "querying facility feed");

        let candidates = self.facility_port.nearby(&query).await.map_err(|err| {
            warn!(feed = self.facility_port.name(), error = %err, "facility feed failed");
            LocateError::from(err)
        })?;

        let facilities = rank_by_distance(position, candidates);
        info!(count = facilities.len(), radius_km, "ranked nearby facilities");
        Ok(facilities)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::model::{FacilityCandidate, GeoPoint};
    use crate::ports::{FeedError, PositionError};

    const KATHMANDU: GeoPoint = GeoPoint {
        latitude: 27.7172,
        longitude: 85.3240,
    };

    enum FakePosition {
        At(GeoPoint),
        Denied,
        Hangs,
    }

    #[async_trait]
    impl PositionPort for FakePosition {
        async fn current_position(&self) -> Result<GeoPoint, PositionError> {
            match self {
                FakePosition::At(point) => Ok(*point),
                FakePosition::Denied => Err(PositionError::Denied),
                FakePosition::Hangs => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(KATHMANDU)
                }
            }
        }
    }

    struct FakeFeed {
        response: Result<Vec<FacilityCandidate>, String>,
        calls: AtomicUsize,
        last_query: Mutex<Option<FacilityQuery>>,
    }

    impl FakeFeed {
        fn returning(candidates: Vec<FacilityCandidate>) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(candidates),
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Err(reason.to_owned()),
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl FacilityPort for FakeFeed {
        fn name(&self) -> &str {
            "fake"
        }

        async fn nearby(&self, query: &FacilityQuery) -> Result<Vec<FacilityCandidate>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().expect("query lock") = Some(*query);
            self.response.clone().map_err(FeedError::Malformed)
        }
    }

    fn candidate(id: &str, latitude: f64, longitude: f64) -> FacilityCandidate {
        FacilityCandidate {
            id: id.to_owned(),
            name: Some(format!("Center {id}")),
            street: None,
            house_number: None,
            position: GeoPoint::new(latitude, longitude),
        }
    }

    #[tokio::test]
    async fn locate_returns_facilities_closest_first() {
        let feed = FakeFeed::returning(vec![
            candidate("far", 27.7000, 85.3000),
            candidate("near", 27.7200, 85.3280),
        ]);
        let service = LocatorService::new(Arc::new(FakePosition::At(KATHMANDU)), Arc::<FakeFeed>::clone(&feed));

        let facilities = service.locate(DEFAULT_RADIUS_KM).await.expect("locate succeeds");

        let ids = facilities.iter().map(|facility| facility.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["near", "far"]);
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);

        let query = feed.last_query.lock().expect("query lock").expect("feed was queried");
        assert_eq!(query.center, KATHMANDU);
        assert!((query.radius_km - 5.0).abs() < f64::EPSILON, "{query:?}");
    }

    #[tokio::test]
    async fn empty_feed_is_not_an_error() {
        let service = LocatorService::new(
            Arc::new(FakePosition::At(KATHMANDU)),
            FakeFeed::returning(Vec::new()),
        );
        assert_eq!(service.locate(5.0).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn invalid_position_is_unavailable() {
        for position in [
            GeoPoint::new(f64::NAN, 85.3),
            GeoPoint::new(27.7, f64::INFINITY),
            GeoPoint::new(27.7, 400.0),
        ] {
            let feed = FakeFeed::returning(vec![candidate("near", 27.72, 85.328)]);
            let service = LocatorService::new(Arc::new(FakePosition::At(position)), Arc::<FakeFeed>::clone(&feed));

            let result = service.locate(DEFAULT_RADIUS_KM).await;

            assert!(
                matches!(result, Err(LocateError::LocationUnavailable(_))),
                "{position:?}: {result:?}"
            );
            assert_eq!(feed.calls.load(Ordering::SeqCst), 0, "{position:?}");
        }
    }

    #[tokio::test]
    async fn denied_position_skips_the_feed() {
        let feed = FakeFeed::returning(vec![candidate("near", 27.72, 85.328)]);
        let service = LocatorService::new(Arc::new(FakePosition::Denied), Arc::<FakeFeed>::clone(&feed));

        assert_eq!(service.locate(5.0).await, Err(LocateError::LocationDenied));
        assert_eq!(feed.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn slow_position_times_out_as_unavailable() {
        let feed = FakeFeed::returning(Vec::new());
        let service = LocatorService::new(Arc::new(FakePosition::Hangs), Arc::<FakeFeed>::clone(&feed))
            .with_position_timeout(Duration::from_millis(20));

        let result = service.locate(5.0).await;
        assert!(
            matches!(result, Err(LocateError::LocationUnavailable(_))),
            "unexpected result: {result:?}"
        );
        assert_eq!(feed.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn feed_failure_is_reported_once() {
        let feed = FakeFeed::failing("truncated body");
        let service = LocatorService::new(Arc::new(FakePosition::At(KATHMANDU)), Arc::<FakeFeed>::clone(&feed));

        let result = service.locate(5.0).await;
        assert!(
            matches!(result, Err(LocateError::FacilityFetchFailed(ref reason)) if reason.contains("truncated body")),
            "unexpected result: {result:?}"
        );
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_radius_uses_default() {
        let feed = FakeFeed::returning(Vec::new());
        let service = LocatorService::new(Arc::new(FakePosition::At(KATHMANDU)), Arc::<FakeFeed>::clone(&feed));

        service.locate(f64::NAN).await.expect("locate succeeds");
        let query = feed.last_query.lock().expect("query lock").expect("feed was queried");
        assert!((query.radius_km - DEFAULT_RADIUS_KM).abs() < f64::EPSILON, "{query:?}");
    }
}
