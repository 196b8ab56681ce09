//! Track selection, transport controls and position tracking

use std::sync::Arc;
use std::time::Duration;

use crate::audio::MediaHandle;
use crate::error::{PlayerError, Result};
use crate::model::{Notification, PlaybackTiming, Song, TransportState};

use super::{ControllerEvent, PlaybackController, flatten};

impl PlaybackController {
    /// Load and play `song`, replacing whatever is attached.
    pub fn select(&mut self, song: Song) {
        self.release_media();

        self.selection_epoch += 1;
        let epoch = self.selection_epoch;
        let song_id = song.id;

        tracing::info!(song_id, title = %song.title, epoch, "Selecting track");

        self.current = Some(song.clone());
        self.timing = PlaybackTiming::default();
        self.set_state(TransportState::Loading);

        let location = match self.catalog.resolve_stream_location(song_id) {
            Ok(location) => location,
            Err(e) => {
                self.fail(e.into());
                return;
            }
        };

        let media = Arc::clone(&self.media);
        self.runner.run_blocking(
            "load_stream",
            move || media.open(&location, &song),
            move |outcome| ControllerEvent::StreamLoaded {
                epoch,
                song_id,
                result: flatten(outcome),
            },
        );
    }

    /// Select the playlist row at `index` and start loading it.
    pub fn play_index(&mut self, index: usize) -> Result<()> {
        let song = self.navigator.select_index(index)?.clone();
        self.notify(Notification::SelectionChanged { index: Some(index) });
        self.select(song);
        Ok(())
    }

    /// Reload the current track after a failure or a stop.
    pub fn retry(&mut self) -> Result<()> {
        match (&self.current, self.state) {
            (Some(song), TransportState::Failed | TransportState::Stopped) => {
                let song = song.clone();
                self.select(song);
                Ok(())
            }
            (None, _) => Err(PlayerError::NoTrackLoaded),
            (Some(_), state) => {
                tracing::debug!(%state, "Retry ignored");
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state != TransportState::Playing {
            tracing::debug!(state = %self.state, "Pause ignored");
            return;
        }
        if let Some(handle) = self.media_handle.as_mut() {
            handle.pause();
        }
        self.timing.freeze();
        self.set_state(TransportState::Paused);
        self.notify_position();
    }

    pub fn resume(&mut self) {
        if self.state != TransportState::Paused {
            tracing::debug!(state = %self.state, "Resume ignored");
            return;
        }
        if let Some(handle) = self.media_handle.as_mut() {
            handle.play();
        }
        self.timing.resume();
        self.set_state(TransportState::Playing);
        self.notify_position();
    }

    pub fn toggle_playback(&mut self) {
        match self.state {
            TransportState::Playing => self.pause(),
            TransportState::Paused => self.resume(),
            _ => {}
        }
    }

    pub fn stop(&mut self) {
        if !self.state.has_media() {
            tracing::debug!(state = %self.state, "Stop ignored");
            return;
        }
        self.release_media();
        self.timing.reset();
        self.set_state(TransportState::Stopped);
        self.notify_position();
    }

    /// Seek to `seconds`, clamped to the track. Only while playing or paused.
    ///
    /// The backend seek runs on the blocking lane; the position moves once it lands.
    pub fn seek(&mut self, seconds: f64) {
        if !self.state.has_media() {
            tracing::debug!(state = %self.state, "Seek ignored");
            return;
        }
        let Some(handle) = self.media_handle.as_ref() else {
            return;
        };

        let target = if seconds.is_nan() {
            Duration::ZERO
        } else if self.timing.duration_known() {
            Duration::from_secs_f64(seconds.clamp(0.0, self.timing.duration().as_secs_f64()))
        } else {
            match Duration::try_from_secs_f64(seconds.max(0.0)) {
                Ok(target) => target,
                Err(e) => {
                    tracing::debug!(seconds, error = %e, "Seek target out of range");
                    return;
                }
            }
        };

        let seeker = handle.seeker();
        let epoch = self.selection_epoch;
        self.runner.run_blocking(
            "seek",
            move || seeker.seek(target),
            move |outcome| ControllerEvent::SeekFinished {
                epoch,
                target,
                result: flatten(outcome),
            },
        );
    }

    pub fn seek_relative(&mut self, delta_seconds: f64) {
        let current = self.timing.current_position().as_secs_f64();
        self.seek(current + delta_seconds);
    }

    /// Advance the position clock. Called periodically by the interactive loop.
    pub fn tick(&mut self) {
        if self.state != TransportState::Playing {
            return;
        }

        let finished = self.media_handle.as_ref().is_some_and(|h| h.is_finished());
        if self.timing.reached_end() || finished {
            tracing::info!(song_id = self.current.as_ref().map(|s| s.id), "Track finished");
            self.release_media();
            self.timing.reset();
            self.set_state(TransportState::Stopped);
        }
        self.notify_position();
    }

    pub(super) fn on_stream_loaded(
        &mut self,
        epoch: u64,
        song_id: i64,
        result: Result<Box<dyn MediaHandle>>,
    ) {
        if epoch != self.selection_epoch || self.state != TransportState::Loading {
            // Dropping a late handle releases it
            tracing::debug!(epoch, current_epoch = self.selection_epoch, song_id, "Ignoring stale stream load");
            return;
        }

        let mut handle = match result {
            Ok(handle) => handle,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        let fallback = self
            .current
            .as_ref()
            .map(|s| Duration::from_secs(u64::from(s.duration_seconds)))
            .unwrap_or_default();
        let duration = handle.duration().unwrap_or(fallback);

        handle.play();
        self.media_handle = Some(handle);
        self.timing = PlaybackTiming::start(duration);
        self.set_state(TransportState::Playing);
        self.notify_position();

        tracing::info!(song_id, duration_secs = duration.as_secs(), "Playback started");

        self.report_play(song_id);
    }

    pub(super) fn on_seek_finished(&mut self, epoch: u64, target: Duration, result: Result<()>) {
        if epoch != self.selection_epoch || !self.state.has_media() {
            tracing::debug!(epoch, current_epoch = self.selection_epoch, "Ignoring stale seek");
            return;
        }
        if let Err(e) = result {
            tracing::warn!(error = %e, target_secs = target.as_secs_f64(), "Seek failed");
            self.report_error(&e);
            return;
        }

        tracing::debug!(target_secs = target.as_secs_f64(), "Seeked");
        self.timing.jump_to(target);
        self.notify_position();
    }

    fn fail(&mut self, error: PlayerError) {
        tracing::error!(
            song_id = self.current.as_ref().map(|s| s.id),
            error = %error,
            "Failed to load track"
        );
        self.release_media();
        self.set_state(TransportState::Failed);
        self.report_error(&error);
    }

    fn release_media(&mut self) {
        if let Some(mut handle) = self.media_handle.take() {
            tracing::debug!("Releasing media handle");
            handle.stop();
        }
    }
}
