use std::sync::Arc;

use trashtrip_core::{
    LocateError, LocateState, LocateTicket, RankInfo, RecyclingFacility, ResultSlot, TripEstimate,
    WasteCategory, estimate, parse_quantity, rank_info, service::LocatorService,
};

use crate::config::Cli;

/// Longest quantity the input field accepts, in characters.
const MAX_QUANTITY_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    TripPlanner,
    NearbyCenters,
}

pub(crate) struct App {
    pub service: Arc<LocatorService>,
    pub radius_km: f64,

    pub screen: Screen,

    pub category_index: usize,
    pub quantity_input: String,
    pub estimate: Option<TripEstimate>,

    pub locate_slot: ResultSlot,
    pub facility_index: usize,

    pub rank: RankInfo,
    pub co2_kg: f64,
}

impl App {
    pub(crate) fn new(service: Arc<LocatorService>, cli: &Cli) -> Self {
        Self {
            service,
            radius_km: cli.radius_km,
            screen: Screen::TripPlanner,
            category_index: 0,
            quantity_input: String::new(),
            estimate: None,
            locate_slot: ResultSlot::new(),
            facility_index: 0,
            rank: rank_info(cli.points),
            co2_kg: cli.co2_kg,
        }
    }

    pub(crate) fn selected_category(&self) -> WasteCategory {
        WasteCategory::ALL
            .get(self.category_index)
            .copied()
            .unwrap_or(WasteCategory::Plastic)
    }

    pub(crate) fn select_previous_category(&mut self) {
        self.category_index = self.category_index.saturating_sub(1);
        self.refresh_estimate();
    }

    pub(crate) fn select_next_category(&mut self) {
        if self.category_index + 1 < WasteCategory::ALL.len() {
            self.category_index += 1;
        }
        self.refresh_estimate();
    }

    /// Accepts digits and one decimal point.
    pub(crate) fn push_quantity_char(&mut self, character: char) {
        let is_separator = matches!(character, '.' | ',');
        if self.quantity_input.len() >= MAX_QUANTITY_LEN
            || !(character.is_ascii_digit() || is_separator)
            || (is_separator && self.quantity_input.contains('.'))
        {
            return;
        }
        self.quantity_input.push(if is_separator { '.' } else { character });
        self.refresh_estimate();
    }

    pub(crate) fn pop_quantity_char(&mut self) {
        self.quantity_input.pop();
        self.refresh_estimate();
    }

    pub(crate) fn refresh_estimate(&mut self) {
        self.estimate = parse_quantity(&self.quantity_input)
            .and_then(|quantity| estimate(self.selected_category(), quantity));
    }

    pub(crate) fn facilities(&self) -> &[RecyclingFacility] {
        match self.locate_slot.state() {
            LocateState::Ready(facilities) => facilities.as_slice(),
            _ => &[],
        }
    }

    pub(crate) fn selected_facility(&self) -> Option<&RecyclingFacility> {
        self.facilities().get(self.facility_index)
    }

    pub(crate) fn select_previous_facility(&mut self) {
        self.facility_index = self.facility_index.saturating_sub(1);
    }

    pub(crate) fn select_next_facility(&mut self) {
        if self.facility_index + 1 < self.facilities().len() {
            self.facility_index += 1;
        }
    }

    /// Start a locate request unless one is already running.
    pub(crate) fn begin_locate(&mut self) -> Option<LocateTicket> {
        if self.locate_slot.is_in_flight() {
            return None;
        }
        self.facility_index = 0;
        Some(self.locate_slot.begin())
    }

    pub(crate) fn finish_locate(
        &mut self,
        ticket: LocateTicket,
        outcome: Result<Vec<RecyclingFacility>, LocateError>,
    ) {
        if self.locate_slot.complete(ticket, outcome) {
            self.facility_index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use reqwest::Client;
    use trashtrip_core::{GeoPoint, directions_url};
    use trashtrip_provider_overpass::{FixedPosition, OverpassFacilityPort};

    use super::*;

    fn app() -> App {
        let cli = Cli::try_parse_from(["trashtrip", "--points", "1250"]).expect("cli parses");
        let service = LocatorService::new(
            Arc::new(FixedPosition(GeoPoint::new(27.7172, 85.324))),
            Arc::new(OverpassFacilityPort::with_default_endpoint(Client::new())),
        );
        App::new(Arc::new(service), &cli)
    }

    fn facility(id: &str) -> RecyclingFacility {
        let position = GeoPoint::new(27.72, 85.328);
        RecyclingFacility {
            id: id.to_owned(),
            name: "Recycling Center".to_owned(),
            position,
            street_address: None,
            distance_km: 0.5,
            directions_url: directions_url(position),
        }
    }

    #[test]
    fn estimate_follows_every_input_change() {
        let mut app = app();
        assert_eq!(app.estimate, None);

        for character in "2.5".chars() {
            app.push_quantity_char(character);
        }
        let plastic = app.estimate.expect("estimate after quantity");
        assert_eq!(plastic.days_until_trip, 4);

        app.select_next_category();
        assert_eq!(app.selected_category(), WasteCategory::Glass);
        let glass = app.estimate.expect("estimate after category change");
        assert_eq!(glass.days_until_trip, 2);

        app.pop_quantity_char();
        app.pop_quantity_char();
        app.pop_quantity_char();
        assert_eq!(app.estimate, None);
    }

    #[test]
    fn quantity_input_rejects_letters_and_second_separator() {
        let mut app = app();
        for character in "1a.2,3".chars() {
            app.push_quantity_char(character);
        }
        assert_eq!(app.quantity_input, "1.23");
    }

    #[test]
    fn zero_quantity_gives_no_estimate() {
        let mut app = app();
        app.push_quantity_char('0');
        assert_eq!(app.estimate, None);
    }

    #[test]
    fn locate_cannot_overlap() {
        let mut app = app();
        let ticket = app.begin_locate().expect("first locate starts");
        assert!(app.begin_locate().is_none(), "second locate started while in flight");

        app.finish_locate(ticket, Ok(vec![facility("a"), facility("b")]));
        assert_eq!(app.facilities().len(), 2);
        app.select_next_facility();
        app.select_next_facility();
        assert_eq!(app.selected_facility().map(|found| found.id.as_str()), Some("b"));

        let retry = app.begin_locate().expect("locate restarts once finished");
        assert!(app.facilities().is_empty(), "previous results kept during retry");
        app.finish_locate(retry, Err(LocateError::LocationDenied));
        assert_eq!(app.locate_slot.state(), &LocateState::Failed(LocateError::LocationDenied));
    }

    #[test]
    fn rank_comes_from_configured_points() {
        let app = app();
        assert_eq!(app.rank.points_to_next(), Some(750));
    }
}
