//! Capabilities the recorder needs from the application hosting it.
//!
//! The recorder and command handlers only talk to the outside world through
//! [`Host`]: audio capture and playback, folder and text prompts, and the two
//! kinds of user messages. The terminal session implements it in [`terminal`].

pub mod terminal;
#[cfg(test)]
pub mod testing;

pub use terminal::TerminalHost;

use std::path::{Path, PathBuf};

pub trait Host {
    /// Handle for an in-progress capture, returned by [`Host::begin_capture`].
    type Capture;

    /// Media folder of the open collection, or `None` when no collection is open.
    fn media_dir(&self) -> Option<PathBuf>;

    /// Whether a usable audio input device is available.
    fn has_input_device(&self) -> bool;

    /// Starts capturing microphone audio that will be written to `path`.
    fn begin_capture(&mut self, path: &Path) -> anyhow::Result<Self::Capture>;

    /// Stops a capture and finishes writing its file.
    fn end_capture(&mut self, capture: Self::Capture) -> anyhow::Result<()>;

    /// Plays an audio file through the default output.
    fn play(&mut self, path: &Path) -> anyhow::Result<()>;

    /// Asks the user to pick a folder. `None` when cancelled.
    fn prompt_folder(&mut self, title: &str, current: &Path) -> Option<PathBuf>;

    /// Asks the user for a line of text. `None` when cancelled.
    fn prompt_text(&mut self, title: &str, prompt: &str, default: &str) -> Option<String>;

    /// Shows a warning the user has to acknowledge.
    fn warn(&mut self, message: &str);

    /// Shows a short, non-blocking notification.
    fn notify(&mut self, message: &str);
}
