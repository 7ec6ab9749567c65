//! Traits describing position and facility sources, and the errors they surface.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{FacilityCandidate, FacilityQuery, GeoPoint};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised while resolving the user's current position.
pub enum PositionError {
    /// The user did not grant access to their location.
    #[error("Location access denied")]
    Denied,
    /// Position could not be resolved (timeout, lookup failure, ...).
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to a facility feed.
pub enum FeedError {
    /// Network layer failed, including non-success status codes.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Feed responded with a payload that could not be decoded.
    #[error("Malformed payload: {0}")]
    Malformed(String),
    /// Feed answered but reported that it could not complete the query.
    #[error("Query rejected: {0}")]
    Rejected(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Terminal failure of a single locate invocation.
pub enum LocateError {
    /// Permission to read the position was refused.
    #[error("Location access denied")]
    LocationDenied,
    /// Position lookup timed out or failed.
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),
    /// The facility feed could not be queried or decoded.
    #[error("Facility lookup failed: {0}")]
    FacilityFetchFailed(String),
}

impl LocateError {
    /// Human-readable guidance shown to the user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            LocateError::LocationDenied => {
                "Location access is turned off. Allow location access (or pass --lat/--lon) and try again."
            }
            LocateError::LocationUnavailable(_) => {
                "Could not determine your location. Check your connection and try again."
            }
            LocateError::FacilityFetchFailed(_) => {
                "Could not load nearby recycling centers. Please try again in a moment."
            }
        }
    }
}

impl From<PositionError> for LocateError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::Denied => LocateError::LocationDenied,
            PositionError::Unavailable(reason) => LocateError::LocationUnavailable(reason),
        }
    }
}

impl From<FeedError> for LocateError {
    fn from(err: FeedError) -> Self {
        LocateError::FacilityFetchFailed(err.to_string())
    }
}

#[async_trait]
/// Single-shot source for the user's current position.
pub trait PositionPort: Send + Sync {
    /// Resolve the current position.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError::Denied`] when access was refused, and
    /// [`PositionError::Unavailable`] when the lookup fails.
    async fn current_position(&self) -> Result<GeoPoint, PositionError>;
}

#[async_trait]
/// Point-of-interest feed listing recycling facilities.
pub trait FacilityPort: Send + Sync {
    /// Short name of the backing service, used in logs.
    fn name(&self) -> &str;

    /// Fetch every recycling facility within the query radius, in feed order.
    ///
    /// # Errors
    ///
    /// Returns a [`FeedError`] when the request fails or the payload is malformed.
    async fn nearby(&self, query: &FacilityQuery) -> Result<Vec<FacilityCandidate>, FeedError>;
}
