//! Interactive recording session.
//!
//! Shows the session screen and maps key presses to actions until the user
//! quits. A recording still running at exit is stopped and saved.

use super::{Action, Session};
use crate::config::{KeyChord, Settings, SettingsStore, TomlStore};
use crate::host::{Host, TerminalHost};
use crate::ui::SessionView;
use cliclack::select;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Run(Action),
    Menu,
    Quit,
}

/// Key bindings of the session, built from the configured shortcuts.
#[derive(Debug, Clone)]
pub struct Keymap {
    record: KeyChord,
    play: KeyChord,
}

impl Keymap {
    pub fn new(record: KeyChord, play: KeyChord) -> Self {
        Self { record, play }
    }

    pub fn from_settings<S: SettingsStore>(settings: &mut Settings<S>) -> Self {
        Self::new(settings.record_shortcut(), settings.play_shortcut())
    }

    /// Configured shortcuts take precedence over the built-in keys.
    pub fn resolve(&self, key: &KeyEvent) -> Option<Input> {
        if self.record.matches(key) {
            return Some(Input::Run(Action::ToggleRecording));
        }
        if self.play.matches(key) {
            return Some(Input::Run(Action::PlayLast));
        }

        let plain = key.modifiers.difference(KeyModifiers::SHIFT).is_empty();
        match key.code {
            KeyCode::Esc => Some(Input::Quit),
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => Some(Input::Quit),
            KeyCode::Char('q') if plain => Some(Input::Quit),
            KeyCode::Char('m') | KeyCode::F(10) if plain => Some(Input::Menu),
            _ => None,
        }
    }
}

/// Runs the interactive session on `collection` until the user quits.
///
/// # Errors
/// - If the terminal cannot be initialized or restored
/// - If the config location cannot be determined
pub fn handle_session(collection: PathBuf) -> anyhow::Result<()> {
    tracing::info!("=== flashrec session ===");
    tracing::info!("Collection: {}", collection.display());

    let store = TomlStore::from_default_location()?;
    tracing::info!("Config: {}", store.path().display());
    let mut settings = Settings::new(store);
    let device = settings.audio_device();

    let host = TerminalHost::new(collection, device)?;
    let mut session = Session::new(host, settings);

    let result = run_loop(&mut session);
    session.finish();
    session.host.close()?;

    tracing::info!("Session ended");
    result
}

fn run_loop<S: SettingsStore>(session: &mut Session<TerminalHost, S>) -> anyhow::Result<()> {
    let mut keymap = Keymap::from_settings(&mut session.settings);
    let mut save_dir = resolved_save_dir(session);

    loop {
        let view = SessionView {
            elapsed: session.recorder.elapsed(),
            pending: session.recorder.pending_path(),
            last: session.recorder.last_path(),
            save_dir: save_dir.as_deref(),
            record_chord: keymap.record.to_string(),
            play_chord: keymap.play.to_string(),
            toast: None,
        };
        session.host.draw(view)?;

        let Some(key) = session.host.next_key(POLL_INTERVAL)? else {
            continue;
        };

        let action = match keymap.resolve(&key) {
            Some(Input::Quit) => {
                tracing::debug!("Quit requested");
                return Ok(());
            }
            Some(Input::Menu) => match choose_action(&mut session.host) {
                Some(action) => action,
                None => continue,
            },
            Some(Input::Run(action)) => action,
            None => continue,
        };

        session.run(action);
        if matches!(action, Action::SetKeybindings | Action::SetSaveFolder) {
            keymap = Keymap::from_settings(&mut session.settings);
            save_dir = resolved_save_dir(session);
        }
    }
}

fn resolved_save_dir<S: SettingsStore>(session: &mut Session<TerminalHost, S>) -> Option<PathBuf> {
    let media_dir = session.host.media_dir()?;
    Some(session.settings.save_dir(&media_dir))
}

fn choose_action(host: &mut TerminalHost) -> Option<Action> {
    host.prompt("flashrec", || {
        let mut menu = select("Choose an action:");
        for action in Action::ALL {
            menu = menu.item(action, action.label(), "");
        }
        menu.interact()
    })
}
