//! Terminal implementation of [`Host`].
//!
//! The collection folder is given on the command line; its media folder is the
//! default place for recordings. Audio goes through cpal and the system player,
//! prompts through cliclack, and messages through the session screen.

use super::Host;
use crate::recording::devices::find_input_device;
use crate::recording::{AudioCapture, Player};
use crate::ui::{Screen, SessionView, Toast};
use cliclack::{input, intro};
use console::style;
use crossterm::event::KeyEvent;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the media folder inside a collection folder.
pub const MEDIA_FOLDER: &str = "collection.media";

pub struct TerminalHost {
    collection: PathBuf,
    device: String,
    player: Player,
    screen: Screen,
    toast: Option<Toast>,
}

impl TerminalHost {
    /// Takes over the terminal for a session on `collection`.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new(collection: PathBuf, device: String) -> anyhow::Result<Self> {
        Ok(Self {
            collection,
            device,
            player: Player::new(),
            screen: Screen::new()?,
            toast: None,
        })
    }

    /// Renders `view` with the current notification, if it is still showing.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw(&mut self, view: SessionView) -> anyhow::Result<()> {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
        let view = SessionView {
            toast: self.toast.as_ref().map(Toast::message),
            ..view
        };
        self.screen.draw(&view)
    }

    /// Waits up to `timeout` for a key press.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn next_key(&mut self, timeout: Duration) -> anyhow::Result<Option<KeyEvent>> {
        self.screen.next_key(timeout)
    }

    /// Runs an interactive prompt on the normal terminal.
    ///
    /// Returns `None` when the prompt was cancelled or failed.
    pub fn prompt<T>(&mut self, title: &str, f: impl FnOnce() -> io::Result<T>) -> Option<T> {
        let result = self.screen.suspended(|| {
            intro(style(format!(" {title} ")).on_white().black())?;
            f()
        });
        match result {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => {
                tracing::debug!("Prompt cancelled: {title}");
                None
            }
            Ok(Err(e)) => {
                tracing::error!("Prompt failed: {e}");
                None
            }
            Err(e) => {
                tracing::error!("Failed to switch terminal for prompt: {e:#}");
                None
            }
        }
    }

    /// Restores the terminal and stops playback.
    ///
    /// # Errors
    /// - If the terminal cannot be restored
    pub fn close(&mut self) -> anyhow::Result<()> {
        self.player.stop();
        self.screen.cleanup()
    }
}

impl Host for TerminalHost {
    type Capture = AudioCapture;

    fn media_dir(&self) -> Option<PathBuf> {
        media_dir_of(&self.collection)
    }

    fn has_input_device(&self) -> bool {
        match find_input_device(&self.device) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Input device check failed: {e:#}");
                false
            }
        }
    }

    fn begin_capture(&mut self, path: &Path) -> anyhow::Result<AudioCapture> {
        AudioCapture::start(&self.device, path)
    }

    fn end_capture(&mut self, capture: AudioCapture) -> anyhow::Result<()> {
        tracing::debug!("Finishing capture to {}", capture.path().display());
        capture.finish()?;
        Ok(())
    }

    fn play(&mut self, path: &Path) -> anyhow::Result<()> {
        self.player.play(path)
    }

    fn prompt_folder(&mut self, title: &str, current: &Path) -> Option<PathBuf> {
        let current = current.display().to_string();
        let answer: String = self.prompt(title, || {
            input("Folder for new recordings:")
                .default_input(&current)
                .validate(|text: &String| {
                    let text = text.trim();
                    if text.is_empty() || expand_home(text).is_dir() {
                        Ok(())
                    } else {
                        Err("Not an existing folder")
                    }
                })
                .interact()
        })?;
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        Some(expand_home(answer))
    }

    fn prompt_text(&mut self, title: &str, prompt: &str, default: &str) -> Option<String> {
        self.prompt(title, || input(prompt).default_input(default).interact())
    }

    fn warn(&mut self, message: &str) {
        if let Err(e) = self.screen.show_warning(message) {
            tracing::error!("Failed to show warning {message:?}: {e:#}");
        }
    }

    fn notify(&mut self, message: &str) {
        tracing::info!("{message}");
        self.toast = Some(Toast::new(message));
    }
}

/// Media folder of a collection, or `None` when the collection does not exist.
pub fn media_dir_of(collection: &Path) -> Option<PathBuf> {
    collection
        .is_dir()
        .then(|| collection.join(MEDIA_FOLDER))
}

/// Default collection folder: the first profile of the desktop flashcard app.
pub fn default_collection() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_default()
        .join("Anki2")
        .join("User 1")
}

/// Expands a leading `~` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}
