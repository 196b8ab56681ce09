//! Top bar rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, PlaybackInfo, TransportState, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, playback: &PlaybackInfo) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(16), // Transport state
        ])
        .split(area);

    let focused = ui_state.active_section == ActiveSection::Search;
    let search_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() && !focused {
        "Press / to search..."
    } else {
        ui_state.search_query.as_str()
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(search_style),
        );
    frame.render_widget(search, chunks[0]);

    let state_color = match playback.state {
        TransportState::Playing => Color::Green,
        TransportState::Loading => Color::Yellow,
        TransportState::Failed => Color::Red,
        _ => Color::Cyan,
    };
    let status = Paragraph::new(playback.state.to_string())
        .style(Style::default().fg(state_color))
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    frame.render_widget(status, chunks[1]);
}
