//! Terminal UI for trashtrip that estimates recycling trips and lists nearby centers.

mod app;
mod config;
mod input;
mod ui;

use std::{fs::File, io, sync::Arc, sync::Mutex, time::Duration as StdDuration};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trashtrip_core::{LocateError, LocateTicket, RecyclingFacility, service::LocatorService};
use trashtrip_provider_overpass::OverpassFacilityPort;

use crate::app::App;
use crate::config::Cli;
use crate::input::Action;

type LocateOutcome = (LocateTicket, Result<Vec<RecyclingFacility>, LocateError>);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    // HTTP + service setup
    let client = Client::builder()
        .user_agent(concat!("trashtrip/", env!("CARGO_PKG_VERSION")))
        .timeout(cli.fetch_timeout())
        .build()?;

    let feed = Arc::new(OverpassFacilityPort::new(client.clone(), cli.overpass_url.clone()));
    let service = Arc::new(
        LocatorService::new(cli.position_port(client), feed)
            .with_position_timeout(cli.position_timeout()),
    );
    info!(radius_km = cli.radius_km, overpass = %cli.overpass_url, "starting trashtrip");

    // App state
    let app = App::new(service, &cli);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn init_logging(cli: &Cli) -> Result<()> {
    let path = cli.log_path();
    let file = File::create(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    // stdout belongs to the terminal UI, so logs go to a file
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<LocateOutcome>();

    loop {
        apply_outcomes(&mut app, &mut outcome_rx);

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::LocateNearby => spawn_locate(&mut app, &outcome_tx),
            }
        }
    }

    Ok(())
}

fn spawn_locate(app: &mut App, outcome_tx: &UnboundedSender<LocateOutcome>) {
    let Some(ticket) = app.begin_locate() else {
        debug!("locate already in flight, ignoring request");
        return;
    };

    let service = Arc::clone(&app.service);
    let radius_km = app.radius_km;
    let outcome_tx = outcome_tx.clone();
    tokio::spawn(async move {
        let outcome = service.locate(radius_km).await;
        // receiver is gone only when the UI has shut down
        if outcome_tx.send((ticket, outcome)).is_err() {
            debug!(ticket = ticket.sequence(), "ui closed before locate finished");
        }
    });
}

fn apply_outcomes(app: &mut App, outcome_rx: &mut UnboundedReceiver<LocateOutcome>) {
    while let Ok((ticket, outcome)) = outcome_rx.try_recv() {
        app.finish_locate(ticket, outcome);
    }
}
