//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, LibraryView};
use crate::config::ControlsSettings;
use crate::engine::RepeatMode;

/// Render the controls help text, incorporating seek seconds.
fn controls_text(seek_seconds: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[enter] play selected".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] seek -/+{seek_seconds}s"),
        "[s] shuffle".to_string(),
        "[r] repeat".to_string(),
        "[d] detail".to_string(),
        "[R] rescan".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format milliseconds as `MM:SS`.
fn format_mmss(ms: u64) -> String {
    let secs = Duration::from_millis(ms).as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    match app.current_track() {
        Some(track) => {
            let state = if app.playback.is_playing {
                "Playing"
            } else {
                "Paused"
            };
            parts.push(format!(
                "Song: {} [{} / {}]",
                track.display,
                format_mmss(app.playback.position_ms),
                format_mmss(app.playback.duration_ms),
            ));
            parts.push(state.to_string());
        }
        None => parts.push("Stopped".to_string()),
    }

    let repeat = match app.playback.repeat_mode {
        RepeatMode::All => "REPEAT: All",
        RepeatMode::One => "REPEAT: One",
    };
    parts.push(repeat.to_string());

    if app.playback.shuffle_enabled {
        parts.push("Shuffle: ON".to_string());
    } else {
        parts.push("Shuffle: OFF".to_string());
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw(frame: &mut Frame, app: &App, controls: &ControlsSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Status box
    let status = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" vivace "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[0]);

    // Main list (or a placeholder while the library is loading/broken)
    match &app.view {
        LibraryView::Loading => {
            let msg = Paragraph::new("Scanning library...")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" tracks "));
            frame.render_widget(msg, chunks[1]);
        }
        LibraryView::Failed(reason) => {
            let msg = Paragraph::new(format!("Library scan failed: {reason}\n[R] retries"))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" tracks "))
                .wrap(Wrap { trim: true });
            frame.render_widget(msg, chunks[1]);
        }
        LibraryView::Ready(tracks) if tracks.is_empty() => {
            let msg = Paragraph::new("No audio files found")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" tracks "));
            frame.render_widget(msg, chunks[1]);
        }
        LibraryView::Ready(tracks) => {
            // Only build items for the visible window around the selection.
            let total = tracks.len();
            let list_height = chunks[1].height as usize;
            let sel = app.selected.min(total.saturating_sub(1));
            let (start, end, sel_in_visible) = if total <= list_height || list_height == 0 {
                (0, total, sel)
            } else {
                let half = list_height / 2;
                let mut start = sel.saturating_sub(half);
                if start + list_height > total {
                    start = total - list_height;
                }
                (start, start + list_height, sel - start)
            };

            let current_id = app.playback.current_track_id;
            let visible_items: Vec<ListItem> = tracks[start..end]
                .iter()
                .map(|t| {
                    if Some(t.id) == current_id {
                        ListItem::new(format!("♪ {}", t.display))
                    } else {
                        ListItem::new(format!("  {}", t.display))
                    }
                })
                .collect();

            let list = List::new(visible_items)
                .block(Block::default().borders(Borders::ALL).title(" tracks "))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            let mut state = ratatui::widgets::ListState::default();
            if total > 0 {
                state.select(Some(sel_in_visible));
            }
            frame.render_stateful_widget(list, chunks[1], &mut state);
        }
    }

    // Now-playing detail overlay (keeps the list visible under it)
    if app.detail_open {
        let popup_area = centered_rect_sized(72, 9, chunks[1]);
        frame.render_widget(Clear, popup_area);

        let detail = if let Some(track) = app.current_track().or_else(|| app.selected_track()) {
            format!(
                "Title: {}\nArtist: {}\nAlbum: {}\nPosition: {} / {}\nPath: {}",
                track.title,
                track.artist.as_deref().unwrap_or("-"),
                track.album.as_deref().unwrap_or("-"),
                format_mmss(app.playback.position_ms),
                format_mmss(app.playback.duration_ms),
                track.path.display()
            )
        } else {
            "Nothing playing".to_string()
        };
        let detail_paragraph = Paragraph::new(detail)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" now playing (d closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(detail_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls.seek_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[2]);
}
