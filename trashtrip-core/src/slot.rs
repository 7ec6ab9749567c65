//! Result slot that keeps only the newest locate outcome.
//!
//! Each locate request takes a [`LocateTicket`] carrying a monotonically increasing
//! sequence number. A completed request only updates the slot when its ticket is
//! still the latest one issued; results of superseded requests are dropped.

use tracing::debug;

use crate::model::RecyclingFacility;
use crate::ports::LocateError;

#[derive(Debug, Clone, PartialEq, Default)]
/// Visible state of the nearby-facility lookup.
pub enum LocateState {
    /// No lookup has run yet.
    #[default]
    Idle,
    /// A lookup is in flight.
    Locating,
    /// The latest lookup succeeded; the list may be empty.
    Ready(Vec<RecyclingFacility>),
    /// The latest lookup failed.
    Failed(LocateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Sequence number handed out for one locate request.
pub struct LocateTicket(u64);

impl LocateTicket {
    /// Raw sequence number.
    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
/// Owner of the visible [`LocateState`].
pub struct ResultSlot {
    latest: u64,
    state: LocateState,
}

impl ResultSlot {
    /// Create an idle slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current visible state.
    #[must_use]
    pub fn state(&self) -> &LocateState {
        &self.state
    }

    /// Whether the newest request has not completed yet.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, LocateState::Locating)
    }

    /// Start a new request, discarding whatever was shown before.
    pub fn begin(&mut self) -> LocateTicket {
        self.latest = self.latest.saturating_add(1);
        self.state = LocateState::Locating;
        LocateTicket(self.latest)
    }

    /// Store the outcome of the request identified by `ticket`.
    ///
    /// Returns `false` and leaves the slot untouched when a newer request was
    /// started in the meantime.
    pub fn complete(
        &mut self,
        ticket: LocateTicket,
        outcome: Result<Vec<RecyclingFacility>, LocateError>,
    ) -> bool {
        if ticket.0 != self.latest {
            debug!(stale = ticket.0, latest = self.latest, "dropping superseded locate result");
            return false;
        }

        self.state = match outcome {
            Ok(facilities) => LocateState::Ready(facilities),
            Err(err) => LocateState::Failed(err),
        };
        true
    }
}
