mod audio;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod tasks;
mod view;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

use audio::{AudioOutput, RodioBackend};
use config::AppConfig;
use controller::{ControllerEvent, PlaybackController};
use model::{CatalogClient, Notification, UiState};
use tasks::TaskRunner;
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Catalog Player Starting ===");

    // The output stream must outlive every sink created on its mixer
    let output = AudioOutput::open_default().context("Could not open the default audio device")?;

    let catalog = CatalogClient::new(&config).context("Could not build the catalog client")?;
    tracing::info!(server = %catalog.base_url(), "Catalog client ready");

    let stream_http = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .build()
        .context("Could not build the streaming client")?;
    let backend = RodioBackend::new(stream_http, Handle::current(), output.mixer());

    let (runner, completions) = TaskRunner::new();
    let mut controller = PlaybackController::new(catalog, Arc::new(backend), runner);
    let notifications = controller.subscribe();

    controller.refresh();

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    let res = run_app(&mut terminal, &config, &mut controller, completions, notifications).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::debug!(
        state = %controller.state(),
        song_id = controller.current_track().map(|s| s.id),
        "Releasing playback"
    );
    controller.stop();
    drop(output);

    tracing::info!("Catalog Player shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &AppConfig,
    controller: &mut PlaybackController,
    mut completions: mpsc::UnboundedReceiver<ControllerEvent>,
    mut notifications: broadcast::Receiver<Notification>,
) -> io::Result<()> {
    let mut ui_state = UiState::default();
    let mut keys = EventStream::new();
    let mut ticker = tokio::time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ui_state.auto_clear_old_errors();

        let playback = controller.playback_info();
        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, controller.playlist(), controller.selected_index());
        })?;

        if ui_state.should_quit {
            break;
        }

        tokio::select! {
            maybe_event = keys.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => controller.handle_key_event(key, &mut ui_state),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            },
            Some(event) = completions.recv() => controller.handle_event(event),
            notification = notifications.recv() => match notification {
                Ok(notification) => apply_notification(&mut ui_state, notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "UI fell behind on notifications");
                    ui_state.clamp_cursor(controller.playlist().len());
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = ticker.tick() => controller.tick(),
        }
    }

    Ok(())
}

fn apply_notification(ui_state: &mut UiState, notification: Notification) {
    match notification {
        Notification::Error { message } => ui_state.set_error(message),
        Notification::SelectionChanged { index: Some(index) } => ui_state.cursor = index,
        Notification::PlaylistChanged { len } => ui_state.clamp_cursor(len),
        Notification::TransportChanged { state, song_id } => {
            tracing::trace!(%state, ?song_id, "Transport changed");
        }
        Notification::SelectionChanged { index: None } | Notification::PositionChanged { .. } => {}
    }
}
