//! Full-screen terminal handling for the recording session.
//!
//! Owns raw mode and the alternate screen. Prompts run with the screen
//! suspended so they can use the normal terminal; warnings take over the whole
//! screen until a key is pressed.

use super::session::{render_session, SessionView};
use crossterm::{
    event::{
        self, Event, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{prelude::*, widgets::Paragraph};
use std::io::{self, Stdout};
use std::time::Duration;

const WARNING_BG: Color = Color::Rgb(255, 0, 0);
const WARNING_FG: Color = Color::Rgb(255, 255, 255);

pub struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Whether the terminal reports modifier keys unambiguously
    enhanced: bool,
    /// False while suspended for a prompt
    active: bool,
}

impl Screen {
    /// Enters raw mode and the alternate screen.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        let enhanced = supports_keyboard_enhancement().unwrap_or(false);
        if !enhanced {
            tracing::debug!("Keyboard enhancement unsupported; Ctrl+Shift chords may be ambiguous");
        }

        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        let mut screen = Screen {
            terminal,
            enhanced,
            active: false,
        };
        screen.enter()?;
        Ok(screen)
    }

    fn enter(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        if self.enhanced {
            execute!(
                self.terminal.backend_mut(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
        }
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        self.active = true;
        Ok(())
    }

    fn leave(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        if self.enhanced {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Runs `f` on the normal terminal, restoring the session screen afterwards.
    ///
    /// # Errors
    /// - If the terminal mode cannot be switched
    pub fn suspended<T>(&mut self, f: impl FnOnce() -> T) -> anyhow::Result<T> {
        self.leave()?;
        let result = f();
        self.enter()?;
        Ok(result)
    }

    /// Renders one frame of the session screen.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw(&mut self, view: &SessionView) -> anyhow::Result<()> {
        self.terminal.draw(|frame| render_session(frame, view))?;
        Ok(())
    }

    /// Waits up to `timeout` for a key press.
    ///
    /// Key releases and repeats are ignored.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn next_key(&mut self, timeout: Duration) -> anyhow::Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(key));
                }
            }
        }
        Ok(None)
    }

    /// Displays a message on a full red screen with centered white text.
    ///
    /// Waits for any key press to dismiss it. The message wraps to 80% of screen width.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_warning(&mut self, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| render_warning(frame, message))?;
            if self.next_key(Duration::from_millis(100))?.is_some() {
                break;
            }
        }
        Ok(())
    }

    /// Restores the terminal to its normal state.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        self.leave()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn render_warning(frame: &mut Frame, message: &str) {
    let area = frame.area();
    frame
        .buffer_mut()
        .set_style(area, Style::default().bg(WARNING_BG));

    let padding_x = area.width / 10;
    let text_width = (u32::from(area.width) * 80 / 100) as u16;

    let text = Line::from(Span::styled(
        message,
        Style::default().fg(WARNING_FG).bg(WARNING_BG),
    ));
    let hint = Line::from(Span::styled(
        "press any key",
        Style::default()
            .fg(WARNING_FG)
            .bg(WARNING_BG)
            .add_modifier(Modifier::DIM),
    ));

    let paragraph = Paragraph::new(vec![text, Line::default(), hint])
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true });

    let centered_area = Rect {
        x: area.x + padding_x,
        y: area.y + area.height / 2,
        width: text_width,
        height: area.height / 2,
    };

    frame.render_widget(paragraph, centered_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_warning_fills_screen_red() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|frame| render_warning(frame, "No collection is open."))
            .unwrap();

        let buffer = terminal.backend().buffer();
        assert!(buffer.content().iter().all(|cell| cell.bg == WARNING_BG));
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("No collection is open."));
    }

    #[test]
    fn test_warning_on_very_wide_terminal() {
        let mut terminal = Terminal::new(TestBackend::new(1000, 6)).unwrap();
        terminal
            .draw(|frame| render_warning(frame, "No recording available yet."))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("No recording available yet."));
    }
}
