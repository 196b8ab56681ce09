//! Playlist and selection bookkeeping

use crate::error::{PlayerError, Result};
use super::song::Song;

/// Owns the playlist currently shown to the user and the selected row.
///
/// Invariant: when `selected` is `Some(i)`, `i < songs.len()`.
#[derive(Clone, Debug, Default)]
pub struct PlaylistNavigator {
    songs: Vec<Song>,
    selected: Option<usize>,
}

impl PlaylistNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Replace the playlist. Selection is always cleared.
    pub fn set_playlist(&mut self, songs: Vec<Song>) {
        self.songs = songs;
        self.selected = None;
    }

    pub fn select_index(&mut self, index: usize) -> Result<&Song> {
        if index >= self.songs.len() {
            return Err(PlayerError::IndexOutOfRange { index, len: self.songs.len() });
        }
        self.selected = Some(index);
        Ok(&self.songs[index])
    }

    /// Move the selection one row down. `None` means nothing changed.
    pub fn next(&mut self) -> Option<&Song> {
        let current = self.selected?;
        if current + 1 >= self.songs.len() {
            return None;
        }
        self.selected = Some(current + 1);
        self.songs.get(current + 1)
    }

    /// Move the selection one row up. `None` means nothing changed.
    pub fn previous(&mut self) -> Option<&Song> {
        let current = self.selected?;
        if current == 0 {
            return None;
        }
        self.selected = Some(current - 1);
        self.songs.get(current - 1)
    }

    /// Swap in an updated copy of a record, matched by id. Returns whether a row changed.
    pub fn replace_song(&mut self, updated: Song) -> bool {
        match self.songs.iter_mut().find(|s| s.id == updated.id) {
            Some(slot) if *slot != updated => {
                *slot = updated;
                true
            }
            _ => false,
        }
    }
}
