//! UI-side state and observer notifications

use std::time::{Duration, Instant};

use super::playback::TransportState;

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

/// Change notifications published by the playback controller.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    PlaylistChanged { len: usize },
    SelectionChanged { index: Option<usize> },
    TransportChanged { state: TransportState, song_id: Option<i64> },
    PositionChanged { position: Duration, duration: Duration },
    /// User-facing, non-fatal failure
    Error { message: String },
}

/// Which part of the screen receives key input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ActiveSection {
    Search,
    #[default]
    Songs,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Songs,
            ActiveSection::Songs => ActiveSection::Search,
        }
    }
}

/// Presentation state owned by the front end
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    /// Highlighted row; distinct from the navigator's selection until Enter is pressed
    pub cursor: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub should_quit: bool,
}

impl UiState {
    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.error_timestamp = Some(Instant::now());
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
        self.error_timestamp = None;
    }

    pub fn auto_clear_old_errors(&mut self) {
        if self
            .error_timestamp
            .is_some_and(|at| at.elapsed() >= ERROR_DISPLAY_TIME)
        {
            self.clear_error();
        }
    }

    pub fn move_cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_down(&mut self, len: usize) {
        if self.cursor < len.saturating_sub(1) {
            self.cursor += 1;
        }
    }

    /// Keep the cursor on a valid row after the playlist changed
    pub fn clamp_cursor(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}
