//! Transport state and position tracking

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use super::song::{Song, format_duration};

/// Lifecycle stage of the current track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
    Failed,
}

impl TransportState {
    /// States in which a media handle is attached.
    pub fn has_media(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// Position bookkeeping that extrapolates elapsed time while playing.
#[derive(Clone, Debug)]
pub struct PlaybackTiming {
    position: Duration,
    last_update: Instant,
    is_running: bool,
    duration: Duration,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            position: Duration::ZERO,
            last_update: Instant::now(),
            is_running: false,
            duration: Duration::ZERO,
        }
    }
}

impl PlaybackTiming {
    pub fn start(duration: Duration) -> Self {
        Self {
            position: Duration::ZERO,
            last_update: Instant::now(),
            is_running: true,
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Zero means the length is unknown; the clock is then never capped.
    pub fn duration_known(&self) -> bool {
        !self.duration.is_zero()
    }

    /// Current position, never past a known duration.
    pub fn current_position(&self) -> Duration {
        let position = if self.is_running {
            self.position.saturating_add(self.last_update.elapsed())
        } else {
            self.position
        };
        self.cap(position)
    }

    /// Freeze the clock at the current position.
    pub fn freeze(&mut self) {
        self.position = self.current_position();
        self.last_update = Instant::now();
        self.is_running = false;
    }

    /// Restart the clock from the frozen position.
    pub fn resume(&mut self) {
        self.last_update = Instant::now();
        self.is_running = true;
    }

    pub fn jump_to(&mut self, position: Duration) {
        self.position = self.cap(position);
        self.last_update = Instant::now();
    }

    pub fn reset(&mut self) {
        self.position = Duration::ZERO;
        self.last_update = Instant::now();
        self.is_running = false;
    }

    /// Always false for an unknown duration; the media handle decides then.
    pub fn reached_end(&self) -> bool {
        self.is_running && self.duration_known() && self.current_position() >= self.duration
    }

    fn cap(&self, position: Duration) -> Duration {
        if self.duration_known() {
            position.min(self.duration)
        } else {
            position
        }
    }
}

/// Snapshot of the playback session for rendering.
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub state: TransportState,
    pub track: Option<Song>,
    pub position: Duration,
    pub duration: Duration,
}

impl PlaybackInfo {
    pub fn elapsed_label(&self) -> String {
        format_duration(self.position.as_secs())
    }

    pub fn duration_label(&self) -> String {
        format_duration(self.duration.as_secs())
    }

    pub fn progress_ratio(&self) -> f64 {
        if self.duration.is_zero() {
            0.0
        } else {
            (self.position.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
        }
    }
}
