use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use trashtrip_core::{GeoPoint, PositionPort, model::DEFAULT_RADIUS_KM};
use trashtrip_provider_overpass::{
    ConsentGate, DEFAULT_ENDPOINT, FixedPosition, IpApiPosition, position::DEFAULT_IP_API_ENDPOINT,
};

/// Plan recycling trips and find recycling centers near you.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Latitude of a fixed position; skips the IP lookup
    #[arg(
        long,
        env = "TRASHTRIP_LAT",
        requires = "lon",
        allow_hyphen_values = true,
        value_parser = parse_latitude
    )]
    pub lat: Option<f64>,

    /// Longitude of a fixed position; skips the IP lookup
    #[arg(
        long,
        env = "TRASHTRIP_LON",
        requires = "lat",
        allow_hyphen_values = true,
        value_parser = parse_longitude
    )]
    pub lon: Option<f64>,

    /// Do not allow access to your location
    #[arg(long, env = "TRASHTRIP_NO_LOCATION")]
    pub no_location: bool,

    /// Search radius for recycling centers, in kilometres
    #[arg(long, env = "TRASHTRIP_RADIUS_KM", default_value_t = DEFAULT_RADIUS_KM)]
    pub radius_km: f64,

    /// Overpass interpreter endpoint
    #[arg(long, env = "TRASHTRIP_OVERPASS_URL", default_value = DEFAULT_ENDPOINT)]
    pub overpass_url: String,

    /// IP geolocation endpoint (ip-api.com JSON format)
    #[arg(long, env = "TRASHTRIP_IP_LOOKUP_URL", default_value = DEFAULT_IP_API_ENDPOINT)]
    pub ip_lookup_url: String,

    /// Seconds to wait for the position before giving up
    #[arg(long, env = "TRASHTRIP_POSITION_TIMEOUT_SECS", default_value_t = 10)]
    pub position_timeout_secs: u64,

    /// Seconds before an HTTP request is abandoned
    #[arg(long, env = "TRASHTRIP_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Your recycling points, used for the rank display
    #[arg(long, env = "TRASHTRIP_POINTS", default_value_t = 0)]
    pub points: u64,

    /// CO₂ you saved so far, in kilograms
    #[arg(long, env = "TRASHTRIP_CO2_KG", default_value_t = 0.0)]
    pub co2_kg: f64,

    /// Log file; defaults to trashtrip.log in the temp directory
    #[arg(long, env = "TRASHTRIP_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub(crate) fn fixed_position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.lat?, self.lon?))
    }

    pub(crate) fn position_timeout(&self) -> Duration {
        Duration::from_secs(self.position_timeout_secs)
    }

    pub(crate) fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("trashtrip.log"))
    }

    /// Position source honoring `--lat/--lon` and `--no-location`.
    pub(crate) fn position_port(&self, client: Client) -> Arc<dyn PositionPort> {
        let source: Arc<dyn PositionPort> = match self.fixed_position() {
            Some(point) => Arc::new(FixedPosition(point)),
            None => Arc::new(IpApiPosition::new(client, self.ip_lookup_url.clone())),
        };
        Arc::new(ConsentGate::new(source, !self.no_location))
    }
}

fn parse_latitude(raw: &str) -> Result<f64, String> {
    parse_degrees(raw, 90.0)
}

fn parse_longitude(raw: &str) -> Result<f64, String> {
    parse_degrees(raw, 180.0)
}

fn parse_degrees(raw: &str, limit: f64) -> Result<f64, String> {
    let degrees = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("`{raw}` is not a number: {err}"))?;
    if degrees.is_finite() && (-limit..=limit).contains(&degrees) {
        Ok(degrees)
    } else {
        Err(format!("`{raw}` is outside -{limit}..={limit}"))
    }
}
