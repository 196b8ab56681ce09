//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackInfo, TransportState};

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let status_text = match (&playback.track, playback.state) {
        (None, _) => " No track playing".to_string(),
        (Some(track), TransportState::Playing) => format!(" ▶ {} | {}", track.title, track.artist),
        (Some(track), TransportState::Paused) => format!(" ⏸ {} | {}", track.title, track.artist),
        (Some(track), TransportState::Loading) => format!(" … {} | {}", track.title, track.artist),
        (Some(track), TransportState::Failed) => format!(" ✗ {} | {} (R to retry)", track.title, track.artist),
        (Some(track), _) => format!(" ■ {} | {}", track.title, track.artist),
    };

    let time_str = format!("{} / {}", playback.elapsed_label(), playback.duration_label());
    let controls = " space play/pause | n/p next/prev | ←/→ seek | s stop | q quit ";

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(playback.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}
