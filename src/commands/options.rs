//! Settings dialogs: recording folder and keybindings.

use crate::config::{KeyChord, Settings, SettingsStore};
use crate::host::Host;
use std::path::PathBuf;

/// Asks for a new recording folder and persists it.
///
/// Cancelling or submitting an empty path leaves the configuration untouched.
pub fn set_save_dir<H: Host, S: SettingsStore>(host: &mut H, settings: &mut Settings<S>) {
    let current = current_save_dir(host, settings);
    let Some(dir) = host.prompt_folder("Select Recording Folder", &current) else {
        tracing::debug!("Recording folder selection cancelled");
        return;
    };
    if dir.as_os_str().is_empty() {
        return;
    }

    match settings.set_save_dir(&dir) {
        Ok(()) => {
            tracing::info!("Recording folder set to {}", dir.display());
            host.notify(&format!("Recording folder set to: {}", dir.display()));
        }
        Err(e) => {
            tracing::error!("Failed to save recording folder: {e:#}");
            host.warn(&format!("Failed to save settings: {e}"));
        }
    }
}

/// Folder offered as the starting point of the folder prompt.
fn current_save_dir<H: Host, S: SettingsStore>(host: &H, settings: &mut Settings<S>) -> PathBuf {
    if let Some(media_dir) = host.media_dir() {
        return settings.save_dir(&media_dir);
    }
    let configured = settings.config().save_dir;
    if !configured.trim().is_empty() {
        return PathBuf::from(configured.trim());
    }
    dirs::home_dir().unwrap_or_default()
}

/// Asks for both shortcuts, then persists them in canonical form.
///
/// The record chord is asked first. Cancelling either prompt or entering an
/// invalid chord leaves both shortcuts unchanged.
pub fn set_keybindings<H: Host, S: SettingsStore>(host: &mut H, settings: &mut Settings<S>) {
    let current_record = settings.record_shortcut_text();
    let Some(record) = ask_chord(
        host,
        "Recording Shortcut",
        "Set shortcut for Toggle Recording:",
        &current_record,
        "Invalid shortcut for recording.",
    ) else {
        return;
    };

    let current_play = settings.play_shortcut_text();
    let Some(play) = ask_chord(
        host,
        "Playback Shortcut",
        "Set shortcut for Play Last Recording:",
        &current_play,
        "Invalid shortcut for playback.",
    ) else {
        return;
    };

    match settings.set_shortcuts(&record, &play) {
        Ok(()) => {
            tracing::info!("Shortcuts updated: record={record}, play={play}");
            host.notify("Shortcuts updated.");
        }
        Err(e) => {
            tracing::error!("Failed to save shortcuts: {e:#}");
            host.warn(&format!("Failed to save settings: {e}"));
        }
    }
}

fn ask_chord<H: Host>(
    host: &mut H,
    title: &str,
    prompt: &str,
    current: &str,
    invalid: &str,
) -> Option<KeyChord> {
    let text = host.prompt_text(title, prompt, current)?;
    match text.parse::<KeyChord>() {
        Ok(chord) => Some(chord),
        Err(e) => {
            tracing::warn!("Rejected shortcut {text:?}: {e}");
            host.warn(invalid);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::MemoryStore;
    use crate::config::RecorderConfig;
    use crate::host::testing::ScriptedHost;
    use std::path::Path;

    fn settings() -> Settings<MemoryStore> {
        Settings::new(MemoryStore::with_config(RecorderConfig::default()))
    }

    #[test]
    fn test_set_save_dir_persists_and_notifies() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        let mut settings = settings();
        host.folder_answers.push_back(Some(PathBuf::from("/tmp/voices")));

        set_save_dir(&mut host, &mut settings);

        assert_eq!(settings.config().save_dir, "/tmp/voices");
        assert_eq!(
            settings.save_dir(media.path()),
            Path::new("/tmp/voices").to_path_buf()
        );
        assert_eq!(
            host.notifications,
            vec!["Recording folder set to: /tmp/voices".to_string()]
        );
    }

    #[test]
    fn test_set_save_dir_cancel_keeps_config() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        let mut settings = settings();
        host.folder_answers.push_back(None);
        host.folder_answers.push_back(Some(PathBuf::new()));

        set_save_dir(&mut host, &mut settings);
        set_save_dir(&mut host, &mut settings);

        assert_eq!(settings.config().save_dir, "");
        assert_eq!(settings.store().writes(), 0);
        assert!(host.notifications.is_empty());
    }

    #[test]
    fn test_set_keybindings_canonicalizes() {
        let mut host = ScriptedHost::default();
        let mut settings = settings();
        host.text_answers.push_back(Some("shift+ctrl+k".to_string()));
        host.text_answers.push_back(Some("alt+p".to_string()));

        set_keybindings(&mut host, &mut settings);

        let config = settings.config();
        assert_eq!(config.record_shortcut, "Ctrl+Shift+K");
        assert_eq!(config.play_shortcut, "Alt+P");
        assert_eq!(
            host.text_prompts,
            vec![
                (
                    "Set shortcut for Toggle Recording:".to_string(),
                    "Ctrl+R".to_string()
                ),
                (
                    "Set shortcut for Play Last Recording:".to_string(),
                    "Ctrl+Shift+R".to_string()
                ),
            ]
        );
        assert_eq!(host.notifications, vec!["Shortcuts updated.".to_string()]);
    }

    #[test]
    fn test_set_keybindings_invalid_record_aborts() {
        let mut host = ScriptedHost::default();
        let mut settings = settings();
        host.text_answers.push_back(Some("Ctrl+Banana".to_string()));
        host.text_answers.push_back(Some("Alt+P".to_string()));

        set_keybindings(&mut host, &mut settings);

        assert_eq!(
            host.warnings,
            vec!["Invalid shortcut for recording.".to_string()]
        );
        assert_eq!(host.text_prompts.len(), 1);
        assert_eq!(settings.config().record_shortcut, "Ctrl+R");
        assert_eq!(settings.config().play_shortcut, "Ctrl+Shift+R");
    }

    #[test]
    fn test_set_keybindings_invalid_play_aborts() {
        let mut host = ScriptedHost::default();
        let mut settings = settings();
        host.text_answers.push_back(Some("Ctrl+K".to_string()));
        host.text_answers.push_back(Some("Ctrl+K, Ctrl+C".to_string()));

        set_keybindings(&mut host, &mut settings);

        assert_eq!(
            host.warnings,
            vec!["Invalid shortcut for playback.".to_string()]
        );
        assert_eq!(settings.config().record_shortcut, "Ctrl+R");
    }

    #[test]
    fn test_set_keybindings_cancel_second_prompt() {
        let mut host = ScriptedHost::default();
        let mut settings = settings();
        host.text_answers.push_back(Some("Ctrl+K".to_string()));
        host.text_answers.push_back(None);

        set_keybindings(&mut host, &mut settings);

        assert!(host.warnings.is_empty());
        assert!(host.notifications.is_empty());
        assert_eq!(settings.config().record_shortcut, "Ctrl+R");
    }
}
