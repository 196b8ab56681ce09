//! View module - UI rendering
//!
//! - `utils`: Shared helpers (truncation)
//! - `layout`: Top bar (search box + transport status)
//! - `songs`: Song table
//! - `progress`: Progress bar
//! - `overlays`: Error notification

mod utils;
mod layout;
mod songs;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{PlaybackInfo, Song, UiState};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackInfo,
        ui_state: &UiState,
        playlist: &[Song],
        selected: Option<usize>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + status
                Constraint::Min(0),    // Song table
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, playback);

        let playing_id = playback.track.as_ref().map(|s| s.id);
        songs::render_song_table(frame, chunks[1], ui_state, playlist, selected, playing_id);

        progress::render_progress_bar(frame, chunks[2], playback);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }
    }
}
