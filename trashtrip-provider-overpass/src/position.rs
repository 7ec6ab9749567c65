//! Ways of resolving the user's current position outside a browser.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, info};

use trashtrip_core::{
    model::GeoPoint,
    ports::{PositionError, PositionPort},
};

/// Default IP geolocation endpoint (ip-api.com JSON format).
pub const DEFAULT_IP_API_ENDPOINT: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// Position configured up front, e.g. from the command line.
pub struct FixedPosition(pub GeoPoint);

#[async_trait]
impl PositionPort for FixedPosition {
    async fn current_position(&self) -> Result<GeoPoint, PositionError> {
        Ok(self.0)
    }
}

/// Response of the ip-api.com lookup.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Approximate position derived from the public IP address.
pub struct IpApiPosition {
    client: Client,
    endpoint: String,
}

impl IpApiPosition {
    /// Create a lookup bound to the given HTTP client and endpoint.
    #[must_use]
    pub fn new<E: Into<String>>(client: Client, endpoint: E) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PositionPort for IpApiPosition {
    async fn current_position(&self) -> Result<GeoPoint, PositionError> {
        debug!(endpoint = %self.endpoint, "resolving position from ip address");

        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|err| PositionError::Unavailable(err.to_string()))?
            .json::<IpApiResponse>()
            .await
            .map_err(|err| PositionError::Unavailable(err.to_string()))?;

        if resp.status != "success" {
            let reason = resp.message.unwrap_or(resp.status);
            return Err(PositionError::Unavailable(reason));
        }

        match (resp.lat, resp.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                let position = GeoPoint::new(lat, lon);
                info!(%position, "resolved position from ip address");
                Ok(position)
            }
            _ => Err(PositionError::Unavailable(
                "lookup returned no coordinates".to_owned(),
            )),
        }
    }
}

/// Wraps a position source and refuses to use it without the user's consent.
pub struct ConsentGate {
    inner: Arc<dyn PositionPort>,
    granted: bool,
}

impl ConsentGate {
    /// Gate `inner` behind `granted`.
    #[must_use]
    pub fn new(inner: Arc<dyn PositionPort>, granted: bool) -> Self {
        Self { inner, granted }
    }
}

#[async_trait]
impl PositionPort for ConsentGate {
    async fn current_position(&self) -> Result<GeoPoint, PositionError> {
        if !self.granted {
            debug!("location consent not granted");
            return Err(PositionError::Denied);
        }
        self.inner.current_position().await
    }
}
