//! Session screen: recorder state, recordings and key bindings.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::path::Path;
use std::time::{Duration, Instant};

const FG: Color = Color::Rgb(185, 207, 212);
const BG: Color = Color::Rgb(0, 0, 0);
const ACCENT: Color = Color::Rgb(206, 224, 220);

/// How long a notification stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(2);

/// Short-lived notification shown at the bottom of the session screen.
#[derive(Debug, Clone)]
pub struct Toast {
    message: String,
    shown_at: Instant,
}

impl Toast {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_DURATION
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Everything the session screen shows for one frame.
#[derive(Debug, Default)]
pub struct SessionView<'a> {
    /// Time since recording started, `None` when idle
    pub elapsed: Option<Duration>,
    /// File being recorded
    pub pending: Option<&'a Path>,
    pub last: Option<&'a Path>,
    /// Resolved recording folder, `None` when no collection is open
    pub save_dir: Option<&'a Path>,
    pub record_chord: String,
    pub play_chord: String,
    pub toast: Option<&'a str>,
}

pub fn render_session(frame: &mut Frame, view: &SessionView) {
    let area = frame.area();
    frame
        .buffer_mut()
        .set_style(area, Style::default().bg(BG).fg(FG));

    let [status_area, details_area, keys_area, toast_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(4),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(status(view), status_area);
    frame.render_widget(details(view), details_area);
    frame.render_widget(keys(view), keys_area);

    if let Some(message) = view.toast {
        let toast = Paragraph::new(Line::from(Span::styled(
            format!(" {message} "),
            Style::default().fg(BG).bg(ACCENT),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(toast, toast_area);
    }
}

fn status(view: &SessionView) -> Paragraph<'static> {
    let line = match view.elapsed {
        Some(elapsed) => Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Red)),
            Span::raw("Recording "),
            Span::raw(format_elapsed(elapsed)),
        ]),
        None => Line::from(vec![
            Span::styled("○ ", Style::default().fg(FG)),
            Span::raw("Idle"),
        ]),
    };
    Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" flashrec ")
            .border_style(Style::default().fg(FG)),
    )
}

fn details(view: &SessionView) -> Paragraph<'static> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let folder = match view.save_dir {
        Some(dir) => dir.display().to_string(),
        None => "no collection open".to_string(),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("Folder: ", label),
        Span::raw(folder),
    ])];
    if let Some(pending) = view.pending {
        lines.push(Line::from(vec![
            Span::styled("Writing: ", label),
            Span::raw(file_name(pending)),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Last: ", label),
        Span::raw(view.last.map(file_name).unwrap_or_else(|| "none".to_string())),
    ]));

    Paragraph::new(lines).block(Block::default().borders(Borders::LEFT | Borders::RIGHT))
}

fn keys(view: &SessionView) -> Paragraph<'static> {
    let key = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled(view.record_chord.clone(), key),
        Span::raw(" record  "),
        Span::styled(view.play_chord.clone(), key),
        Span::raw(" play  "),
        Span::styled("m", key),
        Span::raw(" menu  "),
        Span::styled("q", key),
        Span::raw(" quit"),
    ]);
    Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(FG)),
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Formats a duration as `m:ss`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
