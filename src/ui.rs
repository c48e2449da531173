//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, CacheStatus};
use crate::catalog::{TrackDescriptor, WindowEnd};
use crate::config::{PlayerSettings, TimeField, UiSettings};
use crate::player::{PlaybackSnapshot, PlayerState};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected clip".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("x".to_string(), "stop".to_string());
    map.insert("h/l".to_string(), "prev/next clip".to_string());
    // H/L and -/+ are filled dynamically from config.
    map.insert("K".to_string(), "details".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds and volume step.
fn controls_text(player: &PlayerSettings) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "x", "-/+", "gg/G", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] scrub -/+{}s", player.scrub_seconds)),
            "-/+" => Some(format!(
                "[-/+] volume -/+{}%",
                (player.volume_step * 100.0).round() as i64
            )),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `00:12 → 00:22 · 10s`, or `01:05 → end` for natural-end clips.
fn window_label(track: &TrackDescriptor) -> String {
    match track.window_end {
        WindowEnd::At(end) => format!(
            "{} → {} · {}s",
            format_mmss(track.window_start),
            format_mmss(end),
            end.saturating_sub(track.window_start).as_secs()
        ),
        WindowEnd::NaturalEnd => format!("{} → end", format_mmss(track.window_start)),
    }
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
///
/// Times are relative to the clip window.
fn now_playing_time_text(snapshot: &PlaybackSnapshot, ui: &UiSettings) -> Option<String> {
    if ui.time_fields.is_empty() {
        return None;
    }

    let elapsed = snapshot.display_elapsed();
    let total = snapshot.window_duration();

    let mut parts: Vec<String> = Vec::new();
    let relative = snapshot.window_relative_secs();
    if relative < 0.0 {
        // Seeked before the window start; the clip clock has not started yet.
        parts.push(format!("-{:.0}s to start", relative.abs().ceil()));
    }
    for f in &ui.time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.time_separator))
    }
}

fn state_text(state: PlayerState) -> &'static str {
    match state {
        PlayerState::Idle => "Stopped",
        PlayerState::Loading => "Loading",
        PlayerState::Playing => "Playing",
        PlayerState::Paused => "Paused",
    }
}

fn cache_text(status: CacheStatus) -> String {
    match status {
        CacheStatus::Pending => "OFFLINE: checking".to_string(),
        CacheStatus::Downloading {
            progress,
            downloaded,
            total,
        } => format!("OFFLINE: {progress:.0}% ({downloaded}/{total})"),
        CacheStatus::Ready => "OFFLINE: ready".to_string(),
        CacheStatus::Disabled => "OFFLINE: unavailable".to_string(),
    }
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

/// Format an optional duration, rounding up partial seconds, showing total seconds.
fn format_duration_mmss_ceil(d: Option<Duration>) -> String {
    let Some(d) = d else {
        return "-".to_string();
    };

    let mut total_secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        total_secs = total_secs.saturating_add(1);
    }

    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{}:{:02} ({}s)", minutes, seconds, total_secs)
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, player: &PlayerSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" clipdeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let snapshot = &app.playback;

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();

        if app.follow_playback {
            parts.push(" CURSOR: Follow".to_string());
        } else {
            parts.push(" CURSOR: Free-roam".to_string());
        }

        match app.active_track() {
            Some(track) => {
                let time = now_playing_time_text(snapshot, ui_settings);
                if let Some(time) = time {
                    parts.push(format!("Clip: {} [{}]", track.display_name, time));
                } else {
                    parts.push(format!("Clip: {}", track.display_name));
                }
                parts.push(state_text(snapshot.state).to_string());
            }
            None => parts.push(state_text(PlayerState::Idle).to_string()),
        }

        parts.push(format!(
            "VOL: {}%",
            (snapshot.volume * 100.0).round() as i64
        ));
        parts.push(cache_text(app.cache));

        if let Some(root) = &app.asset_root {
            parts.push(format!("Assets: {}", root));
        }

        parts.join(" • ")
    };

    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let ratio = if snapshot.is_idle() {
        0.0
    } else {
        snapshot.progress_ratio()
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" window "))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(ratio);
    let gauge = if snapshot.state == PlayerState::Paused {
        gauge.slow_blink()
    } else {
        gauge
    };
    frame.render_widget(gauge, chunks[2]);

    // Main list
    {
        // Center the selected item when possible by creating a visible window.
        let tracks = app.catalog.tracks();
        let total = tracks.len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = tracks[start..end]
            .iter()
            .map(|track| {
                let marker = if snapshot.active_track != Some(track.id) {
                    "  "
                } else if snapshot.is_playing() {
                    "♪ "
                } else {
                    "‖ "
                };
                ListItem::new(format!(
                    "{}{}  [{}]",
                    marker,
                    track.display_name,
                    window_label(track)
                ))
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" clips "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[3], &mut state);
    }

    // Overlay details popup (keeps list visible under it)
    if app.metadata_window {
        let list_area = chunks[3];
        let popup_area = centered_rect_sized(72, 9, list_area);
        frame.render_widget(Clear, popup_area);

        let meta = if let Some(track) = app.selected_track() {
            let asset_duration = if snapshot.active_track == Some(track.id) {
                snapshot.asset_duration
            } else {
                None
            };
            format!(
                "Clip: {} ({})\nAsset: {}\nWindow: {}\nClip length: {}\nAsset length: {}",
                track.display_name,
                track.id,
                track.asset_ref,
                window_label(track),
                format_duration_mmss_ceil(track.window_duration(asset_duration)),
                format_duration_mmss_ceil(asset_duration),
            )
        } else {
            "No clip selected".to_string()
        };
        let meta_paragraph = Paragraph::new(meta)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" details (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer_text = controls_text(player);
    let footer = Paragraph::new(footer_text)
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

    frame.render_widget(footer, chunks[4]);
}
