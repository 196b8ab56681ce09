//! Song table rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, Song, UiState};
use super::utils::{id_column_width, truncate_string};

const PLAY_COUNT_WIDTH: usize = 6;
const DURATION_WIDTH: usize = 5;

pub fn render_song_table(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    songs: &[Song],
    selected: Option<usize>,
    playing_id: Option<i64>,
) {
    let is_focused = ui_state.active_section == ActiveSection::Songs;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let title = format!(" Songs ({}) ", songs.len());

    if songs.is_empty() {
        let empty = Paragraph::new("No songs. Press r to reload the catalog or / to search.")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    // Format: "{id}  {title}  {artist}  {plays}  {duration}"
    let id_width = id_column_width(songs.iter().map(|s| s.id).max().unwrap_or(0));
    let content_width = area.width.saturating_sub(4) as usize;
    let fixed = id_width + 2 + 2 + 2 + PLAY_COUNT_WIDTH + 2 + DURATION_WIDTH;
    let remaining = content_width.saturating_sub(fixed);
    let title_width = (remaining * 55) / 100;
    let artist_width = remaining.saturating_sub(title_width);

    let header = ListItem::new(Span::styled(
        format!(
            "{:<id_width$}  {}  {}  {:>PLAY_COUNT_WIDTH$}  {:>DURATION_WIDTH$}",
            "#",
            truncate_string("Title", title_width),
            truncate_string("Artist", artist_width),
            "Plays",
            "Time",
        ),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
    ));

    let rows = songs.iter().enumerate().map(|(i, song)| {
        let is_cursor = i == ui_state.cursor;
        let is_playing = playing_id == Some(song.id);

        let mut style = if is_playing {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        if selected == Some(i) {
            style = style.add_modifier(Modifier::BOLD);
        }
        if is_cursor && is_focused {
            style = style.bg(Color::DarkGray);
        }

        ListItem::new(format!(
            "{:<id_width$}  {}  {}  {:>PLAY_COUNT_WIDTH$}  {:>DURATION_WIDTH$}",
            song.id,
            truncate_string(&song.title, title_width),
            truncate_string(&song.artist, artist_width),
            song.play_count,
            song.duration_label(),
        ))
        .style(style)
    });

    let items: Vec<ListItem> = std::iter::once(header).chain(rows).collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .padding(Padding::horizontal(1))
                .border_style(border_style),
        )
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.cursor + 1)); // +1 for header

    frame.render_stateful_widget(list, area, &mut list_state);
}
