//! Controller module - the playback session
//!
//! `PlaybackController` owns the transport state machine, the current media
//! handle and the playlist navigator. It runs on the interactive loop only:
//! every blocking operation goes through the task runner and comes back as a
//! `ControllerEvent` that the loop feeds to `handle_event`.
//!
//! - `playback`: Track selection, transport controls, position tracking
//! - `navigation`: Catalog loads, search, next/previous
//! - `play_count`: Best-effort play-count reporting and single-record refresh
//! - `input`: Key event handling for the terminal front end

mod input;
mod navigation;
mod play_count;
mod playback;

#[cfg(test)]
mod test_support;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::audio::{MediaBackend, MediaHandle};
use crate::error::{CatalogError, MediaError, PlayerError};
use crate::model::{
    CatalogClient, Notification, PlaybackInfo, PlaybackTiming, PlaylistNavigator, Song, TransportState,
};
use crate::tasks::{TaskResult, TaskRunner};

const NOTIFICATION_CAPACITY: usize = 256;

/// Completion messages produced by background work.
pub enum ControllerEvent {
    CatalogLoaded {
        request: u64,
        result: Result<Vec<Song>, PlayerError>,
    },
    StreamLoaded {
        epoch: u64,
        song_id: i64,
        result: Result<Box<dyn MediaHandle>, PlayerError>,
    },
    PlayReported {
        song_id: i64,
        result: Result<Song, PlayerError>,
    },
    SongRefreshed {
        song_id: i64,
        result: Result<Song, PlayerError>,
    },
    SeekFinished {
        epoch: u64,
        target: Duration,
        result: Result<(), PlayerError>,
    },
}

impl fmt::Debug for ControllerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CatalogLoaded { request, result } => f
                .debug_struct("CatalogLoaded")
                .field("request", request)
                .field("songs", &result.as_ref().map(Vec::len))
                .finish(),
            Self::StreamLoaded { epoch, song_id, result } => f
                .debug_struct("StreamLoaded")
                .field("epoch", epoch)
                .field("song_id", song_id)
                .field("ok", &result.is_ok())
                .finish(),
            Self::PlayReported { song_id, result } => f
                .debug_struct("PlayReported")
                .field("song_id", song_id)
                .field("ok", &result.is_ok())
                .finish(),
            Self::SongRefreshed { song_id, result } => f
                .debug_struct("SongRefreshed")
                .field("song_id", song_id)
                .field("ok", &result.is_ok())
                .finish(),
            Self::SeekFinished { epoch, target, result } => f
                .debug_struct("SeekFinished")
                .field("epoch", epoch)
                .field("target", target)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

pub struct PlaybackController {
    catalog: CatalogClient,
    media: Arc<dyn MediaBackend>,
    runner: TaskRunner<ControllerEvent>,
    navigator: PlaylistNavigator,
    state: TransportState,
    current: Option<Song>,
    media_handle: Option<Box<dyn MediaHandle>>,
    timing: PlaybackTiming,
    /// Bumped by every `select`; stream loads from older epochs are ignored
    selection_epoch: u64,
    /// Bumped by every catalog request; older catalog results are ignored
    catalog_epoch: u64,
    observers: broadcast::Sender<Notification>,
}

impl PlaybackController {
    pub fn new(
        catalog: CatalogClient,
        media: Arc<dyn MediaBackend>,
        runner: TaskRunner<ControllerEvent>,
    ) -> Self {
        let (observers, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            catalog,
            media,
            runner,
            navigator: PlaylistNavigator::new(),
            state: TransportState::Idle,
            current: None,
            media_handle: None,
            timing: PlaybackTiming::default(),
            selection_epoch: 0,
            catalog_epoch: 0,
            observers,
        }
    }

    /// Subscribe to playlist, selection, transport, position and error changes.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.observers.subscribe()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn current_track(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    pub fn playlist(&self) -> &[Song] {
        self.navigator.songs()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.navigator.selected_index()
    }

    pub fn playback_info(&self) -> PlaybackInfo {
        let (position, duration) = match self.state {
            TransportState::Idle => Default::default(),
            _ => (self.timing.current_position(), self.timing.duration()),
        };
        PlaybackInfo {
            state: self.state,
            track: self.current.clone(),
            position,
            duration,
        }
    }

    /// Apply a completed background result. Only called from the interactive loop.
    pub fn handle_event(&mut self, event: ControllerEvent) {
        tracing::trace!(?event, "Applying task completion");
        match event {
            ControllerEvent::CatalogLoaded { request, result } => self.on_catalog_loaded(request, result),
            ControllerEvent::StreamLoaded { epoch, song_id, result } => {
                self.on_stream_loaded(epoch, song_id, result)
            }
            ControllerEvent::PlayReported { song_id, result } => self.on_play_reported(song_id, result),
            ControllerEvent::SongRefreshed { song_id, result } => self.on_song_refreshed(song_id, result),
            ControllerEvent::SeekFinished { epoch, target, result } => self.on_seek_finished(epoch, target, result),
        }
    }

    pub(crate) fn notify(&self, notification: Notification) {
        if self.observers.send(notification).is_err() {
            tracing::trace!("No observers subscribed");
        }
    }

    pub(crate) fn set_state(&mut self, state: TransportState) {
        if self.state == state {
            return;
        }
        tracing::debug!(from = %self.state, to = %state, song_id = self.current.as_ref().map(|s| s.id), "Transport state change");
        self.state = state;
        self.notify(Notification::TransportChanged {
            state,
            song_id: self.current.as_ref().map(|s| s.id),
        });
    }

    pub(crate) fn notify_position(&self) {
        self.notify(Notification::PositionChanged {
            position: self.timing.current_position(),
            duration: self.timing.duration(),
        });
    }

    pub(crate) fn report_error(&self, error: &PlayerError) {
        self.notify(Notification::Error {
            message: Self::format_error(error),
        });
    }

    pub fn format_error(error: &PlayerError) -> String {
        match error {
            PlayerError::Catalog(CatalogError::Network(e)) if e.is_timeout() => {
                "Catalog server timed out. Try again.".to_string()
            }
            PlayerError::Catalog(CatalogError::Network(e)) if e.is_connect() => {
                "Cannot reach the catalog server.".to_string()
            }
            PlayerError::Catalog(CatalogError::Network(e)) => format!("Network error: {}", e),
            PlayerError::Catalog(CatalogError::Status { status: 404, .. }) => {
                "Song not found on the server.".to_string()
            }
            PlayerError::Catalog(CatalogError::Status { status, .. }) => {
                format!("Catalog server error ({}).", status)
            }
            PlayerError::Catalog(CatalogError::Decode(_)) => {
                "Catalog server sent an unreadable response.".to_string()
            }
            PlayerError::Catalog(CatalogError::InvalidId(id)) => format!("Invalid song id {}.", id),
            PlayerError::Media(MediaError::Decode(_)) => "This song could not be decoded.".to_string(),
            PlayerError::Media(e) => format!("Playback error: {}", e),
            PlayerError::IndexOutOfRange { .. } => "No song at that position.".to_string(),
            PlayerError::NoTrackLoaded => "Nothing is loaded.".to_string(),
            PlayerError::Task(e) => format!("Internal error: {}", e),
        }
    }
}

/// Collapse a task outcome wrapping a fallible computation into one result.
pub(crate) fn flatten<T, E>(outcome: TaskResult<Result<T, E>>) -> Result<T, PlayerError>
where
    E: Into<PlayerError>,
{
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(e.into()),
    }
}
