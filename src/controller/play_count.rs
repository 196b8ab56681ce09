//! Best-effort play-count reporting

use crate::error::Result;
use crate::model::{Notification, Song};

use super::{ControllerEvent, PlaybackController, flatten};

impl PlaybackController {
    /// Tell the server `song_id` started playing. Fired after the transition into
    /// `Playing`; the outcome never touches transport state.
    pub(super) fn report_play(&self, song_id: i64) {
        let catalog = self.catalog.clone();
        self.runner.run(
            "report_play",
            async move { catalog.report_play(song_id).await },
            move |outcome| ControllerEvent::PlayReported {
                song_id,
                result: flatten(outcome),
            },
        );
    }

    /// Re-read a single record from the server and patch it into the playlist.
    pub fn refresh_song(&self, song_id: i64) {
        let catalog = self.catalog.clone();
        self.runner.run(
            "fetch_song",
            async move { catalog.fetch_song(song_id).await },
            move |outcome| ControllerEvent::SongRefreshed {
                song_id,
                result: flatten(outcome),
            },
        );
    }

    pub(super) fn on_play_reported(&mut self, song_id: i64, result: Result<Song>) {
        match result {
            Ok(updated) => {
                tracing::info!(song_id, play_count = updated.play_count, "Updated play count");
                self.apply_song_update(updated);
            }
            Err(e) => tracing::warn!(song_id, error = %e, "Play count update failed"),
        }
    }

    pub(super) fn on_song_refreshed(&mut self, song_id: i64, result: Result<Song>) {
        match result {
            Ok(updated) => {
                tracing::debug!(song_id, "Song record refreshed");
                self.apply_song_update(updated);
            }
            Err(e) => {
                tracing::warn!(song_id, error = %e, "Song refresh failed");
                self.report_error(&e);
            }
        }
    }

    fn apply_song_update(&mut self, updated: Song) {
        if self.current.as_ref().is_some_and(|s| s.id == updated.id) {
            self.current = Some(updated.clone());
        }
        if self.navigator.replace_song(updated) {
            self.notify(Notification::PlaylistChanged {
                len: self.navigator.len(),
            });
        }
    }
}
