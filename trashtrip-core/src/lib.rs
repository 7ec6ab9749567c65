//! Core types and service wiring for the trashtrip recycling planner.

/// Accumulation estimator projecting when a category is ready for a trip.
pub mod estimator;
/// Great-circle distance and facility ranking.
pub mod geo;
/// Rank tiers and CO₂ equivalents for a user's recycling history.
pub mod impact;
/// Domain models shared by the estimator, the locator, and all providers.
pub mod model;
/// Traits describing the position and facility feed interfaces.
pub mod ports;
/// High-level locator service used by clients.
pub mod service;
/// Sequenced result slot for overlapping locate requests.
pub mod slot;

pub use estimator::*;
pub use geo::*;
pub use impact::*;
pub use model::*;
pub use ports::*;
pub use service::*;
pub use slot::*;
