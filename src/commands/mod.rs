//! Application command handlers for flashrec.
//!
//! The four user actions (toggle recording, play last recording, set recording
//! folder, set keybindings) run against a [`Session`], which owns the host, the
//! settings and the recorder. The remaining submodules implement CLI commands.
//!
//! # Commands
//! - `session`: Interactive recording session (default)
//! - `amplify`: Apply gain to an existing WAV file
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod amplify;
pub mod config;
pub mod list_devices;
pub mod logs;
pub mod options;
pub mod session;

pub use amplify::handle_amplify;
pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use session::handle_session;

use crate::config::{Settings, SettingsStore};
use crate::host::Host;
use crate::recording::{Recorder, RecorderError, Toggled};

/// A user-invokable action, reachable from the menu or a key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleRecording,
    PlayLast,
    SetSaveFolder,
    SetKeybindings,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::ToggleRecording,
        Action::PlayLast,
        Action::SetSaveFolder,
        Action::SetKeybindings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Action::ToggleRecording => "Toggle Recording",
            Action::PlayLast => "Play Last Recording",
            Action::SetSaveFolder => "Set Recording Folder...",
            Action::SetKeybindings => "Set Keybindings...",
        }
    }
}

/// Everything a running session owns: the host, the settings and the recorder.
pub struct Session<H: Host, S: SettingsStore> {
    pub host: H,
    pub settings: Settings<S>,
    pub recorder: Recorder<H::Capture>,
}

impl<H: Host, S: SettingsStore> Session<H, S> {
    pub fn new(host: H, settings: Settings<S>) -> Self {
        Self {
            host,
            settings,
            recorder: Recorder::new(),
        }
    }

    /// Runs one action. Failures end up as warnings or log entries, never as errors.
    pub fn run(&mut self, action: Action) {
        tracing::debug!("Action: {}", action.label());
        match action {
            Action::ToggleRecording => self.toggle_recording(),
            Action::PlayLast => self.play_last(),
            Action::SetSaveFolder => options::set_save_dir(&mut self.host, &mut self.settings),
            Action::SetKeybindings => options::set_keybindings(&mut self.host, &mut self.settings),
        }
    }

    fn toggle_recording(&mut self) {
        match self.recorder.toggle(&mut self.host, &mut self.settings) {
            Ok(Toggled::Started(path)) => {
                tracing::debug!("Writing {}", path.display());
                let chord = self.settings.record_shortcut();
                self.host
                    .notify(&format!("Recording started ({chord} to stop)"));
            }
            Ok(Toggled::Stopped(path)) => self.notify_saved(&path),
            Err(e) => report(&mut self.host, e),
        }
    }

    fn play_last(&mut self) {
        match self.recorder.play_last(&mut self.host) {
            Ok(_) => self.host.notify("Playing last recording"),
            Err(e) => report(&mut self.host, e),
        }
    }

    /// Stops a recording still in progress, so it is saved before the session ends.
    pub fn finish(&mut self) {
        if !self.recorder.is_recording() {
            return;
        }
        match self.recorder.stop(&mut self.host, &mut self.settings) {
            Ok(path) => tracing::info!("Recording saved on exit: {}", path.display()),
            Err(e) => tracing::error!("Failed to save recording on exit: {e}"),
        }
    }

    fn notify_saved(&mut self, path: &std::path::Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.host.notify(&format!("Recording saved: {name}"));
    }
}

fn report<H: Host>(host: &mut H, error: RecorderError) {
    if let RecorderError::MissingFile(path) = &error {
        tracing::debug!("Missing recording: {}", path.display());
    }
    if error.is_user_facing() {
        tracing::warn!("{error}");
        host.warn(&error.to_string());
    } else {
        tracing::debug!("Ignored: {error}");
    }
}
