use chrono::Local;
use ratatui::{
    prelude::*,
    widgets::{
        Block, Borders, Cell, Gauge, List, ListItem, ListState, Paragraph, Row, Table, TableState,
        Wrap,
    },
};
use trashtrip_core::{LocateState, RecyclingFacility, TripEstimate, WasteCategory, trees_equivalent};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new(impact_line(app))
        .block(Block::default().borders(Borders::ALL).title("Trashtrip"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::TripPlanner => draw_trip_planner(frame, app, *content_area),
        Screen::NearbyCenters => draw_nearby_centers(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::TripPlanner => {
            "↑/↓ category · type kg · Enter find centers · Tab/→ nearby · q/Ctrl-C quit"
        }
        Screen::NearbyCenters => "↑/↓ move · Enter/r locate again · Esc/←/b back · q/Ctrl-C quit",
    };

    let (status_text, status_style) = match app.locate_slot.state() {
        LocateState::Locating => (
            format!("Locating… · {nav_hint}"),
            Style::default().fg(Color::Yellow),
        ),
        LocateState::Failed(err) => (
            format!("{} · {nav_hint}", err.user_message()),
            Style::default().fg(Color::Red),
        ),
        LocateState::Idle | LocateState::Ready(_) => (nav_hint.to_owned(), Style::default()),
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn impact_line(app: &App) -> String {
    let rank = &app.rank;
    let next = rank.points_to_next().map_or_else(
        || "top rank reached".to_owned(),
        |missing| format!("{missing} pts to next rank"),
    );
    format!(
        "{} · {} pts ({next}) · {:.1} kg CO₂ saved ≈ {:.1} tree-years",
        rank.tier,
        rank.points,
        app.co2_kg,
        trees_equivalent(app.co2_kg)
    )
}

fn draw_trip_planner(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(area);

    let [list_area, detail_area] = columns.as_ref() else {
        return;
    };

    let items = WasteCategory::ALL
        .iter()
        .map(|category| {
            ListItem::new(format!(
                "{:<16}{:>4} kg",
                category.label(),
                category.threshold_kg()
            ))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Category (↑/↓)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.category_index));
    frame.render_stateful_widget(list, *list_area, &mut state);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Length(3), // gauge
            Constraint::Min(0),    // recommendation
        ])
        .split(*detail_area);

    let [input_area, gauge_area, text_area] = rows.as_ref() else {
        return;
    };

    let category = app.selected_category();
    let input = Paragraph::new(app.quantity_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Estimated {} quantity (kg)", category.label())),
    );
    frame.render_widget(input, *input_area);

    let Some(estimate) = app.estimate else {
        let hint = Paragraph::new("Enter a quantity above zero to see when to visit a recycling center.")
            .block(Block::default().borders(Borders::ALL).title("Recommendation"))
            .wrap(Wrap { trim: true });
        frame.render_widget(hint, *gauge_area);
        return;
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Accumulation"))
        .gauge_style(Style::default().fg(progress_color(&estimate)))
        .percent(u16::from(estimate.rounded_percent()));
    frame.render_widget(gauge, *gauge_area);

    let today = Local::now().date_naive();
    let detail = if estimate.is_ready() {
        "You've accumulated enough. Press Enter to find the nearest recycling center.".to_owned()
    } else {
        format!(
            "Keep collecting, you're almost there! Planned trip: {}.",
            estimate.trip_date(today).format("%a %d.%m.%Y")
        )
    };

    let recommendation = Paragraph::new(vec![
        Line::from(estimate.headline()).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(detail),
    ])
    .block(Block::default().borders(Borders::ALL).title("Recommendation"))
    .wrap(Wrap { trim: true });
    frame.render_widget(recommendation, *text_area);
}

fn draw_nearby_centers(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = format!("Recycling centers within {} km (Enter/r to search)", app.radius_km);

    let message = match app.locate_slot.state() {
        LocateState::Idle => Some("Press Enter to search around your current location.".to_owned()),
        LocateState::Locating => Some("Looking for recycling centers near you…".to_owned()),
        LocateState::Failed(err) => Some(err.user_message().to_owned()),
        LocateState::Ready(facilities) if facilities.is_empty() => Some(format!(
            "No recycling centers found within {} km.",
            app.radius_km
        )),
        LocateState::Ready(_) => None,
    };

    if let Some(message) = message {
        let paragraph = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(area);

    let [table_area, detail_area] = sections.as_ref() else {
        return;
    };

    let rows = app.facilities().iter().map(|facility| {
        Row::new(vec![
            Cell::from(distance_label(facility.distance_km)),
            Cell::from(facility.name.clone()),
            Cell::from(facility.street_address.clone().unwrap_or_default()),
        ])
    });

    let column_widths = [
        Constraint::Length(9),
        Constraint::Percentage(45),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Distance", "Name", "Address"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .column_spacing(1);

    let mut state = TableState::default();
    state.select(Some(app.facility_index));
    frame.render_stateful_widget(table, *table_area, &mut state);

    if let Some(facility) = app.selected_facility() {
        frame.render_widget(facility_detail(facility), *detail_area);
    }
}

fn facility_detail(facility: &RecyclingFacility) -> Paragraph<'_> {
    Paragraph::new(vec![
        Line::from(format!("{} · {}", facility.name, facility.position)),
        Line::from(facility.directions_url.as_str()).style(Style::default().fg(Color::Cyan)),
    ])
    .block(Block::default().borders(Borders::ALL).title("Directions"))
    .wrap(Wrap { trim: true })
}

fn progress_color(estimate: &TripEstimate) -> Color {
    if estimate.is_ready() {
        Color::Green
    } else if estimate.progress_percent >= 50.0 {
        Color::Yellow
    } else {
        Color::Blue
    }
}

fn distance_label(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{:.0} m", distance_km * 1000.0)
    } else {
        format!("{distance_km:.1} km")
    }
}
