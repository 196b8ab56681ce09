//! Key event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, UiState};
use super::PlaybackController;

const SEEK_STEP_SECS: f64 = 5.0;

impl PlaybackController {
    pub fn handle_key_event(&mut self, key: KeyEvent, ui: &mut UiState) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            ui.should_quit = true;
            return;
        }

        // Esc dismisses a visible error before anything else
        if ui.error_message.is_some() && key.code == KeyCode::Esc {
            ui.clear_error();
            return;
        }

        match ui.active_section {
            ActiveSection::Search => match key.code {
                KeyCode::Enter => {
                    self.search(ui.search_query.clone());
                    ui.active_section = ActiveSection::Songs;
                }
                KeyCode::Esc | KeyCode::Tab => ui.active_section = ui.active_section.next(),
                KeyCode::Backspace => {
                    ui.search_query.pop();
                }
                KeyCode::Char(c) => ui.search_query.push(c),
                _ => {}
            },
            ActiveSection::Songs => match key.code {
                KeyCode::Char('q') => ui.should_quit = true,
                KeyCode::Char('/') | KeyCode::Tab => ui.active_section = ui.active_section.next(),
                KeyCode::Up => ui.move_cursor_up(),
                KeyCode::Down => ui.move_cursor_down(self.playlist().len()),
                KeyCode::Enter => {
                    if let Err(e) = self.play_index(ui.cursor) {
                        tracing::debug!(cursor = ui.cursor, error = %e, "Nothing to play");
                        ui.set_error(Self::format_error(&e));
                    }
                }
                KeyCode::Char(' ') => self.toggle_playback(),
                KeyCode::Char('n') => self.next(),
                KeyCode::Char('p') => self.previous(),
                KeyCode::Char('s') => self.stop(),
                KeyCode::Char('r') => self.refresh(),
                KeyCode::Char('i') => {
                    if let Some(song) = self.playlist().get(ui.cursor) {
                        self.refresh_song(song.id);
                    }
                }
                KeyCode::Char('R') => {
                    if let Err(e) = self.retry() {
                        ui.set_error(Self::format_error(&e));
                    }
                }
                KeyCode::Left => self.seek_relative(-SEEK_STEP_SECS),
                KeyCode::Right => self.seek_relative(SEEK_STEP_SECS),
                _ => {}
            },
        }
    }
}
