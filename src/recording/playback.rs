//! Playback through the system audio player.
//!
//! The player is spawned in the background so the session stays responsive.
//! Starting a new playback stops the one still running.

use anyhow::{anyhow, Result};
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Players tried in order, with the arguments placed before the file path.
#[cfg(target_os = "linux")]
const PLAYERS: &[(&str, &[&str])] = &[
    ("paplay", &[]),
    ("pw-play", &[]),
    ("aplay", &["-q"]),
    ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
];

#[cfg(target_os = "macos")]
const PLAYERS: &[(&str, &[&str])] = &[("afplay", &[])];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const PLAYERS: &[(&str, &[&str])] = &[("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"])];

/// Background audio player.
#[derive(Debug, Default)]
pub struct Player {
    current: Option<Child>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts playing `path`, stopping any playback still in progress.
    ///
    /// # Errors
    /// - If no audio player could be started
    pub fn play(&mut self, path: &Path) -> Result<()> {
        self.stop();
        let child = spawn_player(path)?;
        self.current = Some(child);
        Ok(())
    }

    /// Stops the current playback, if any.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.current.take() {
            if let Ok(None) = child.try_wait() {
                if let Err(e) = child.kill() {
                    tracing::debug!("Failed to stop player: {e}");
                }
            }
            let _ = child.wait();
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(not(target_os = "windows"))]
fn spawn_player(path: &Path) -> Result<Child> {
    for (player, args) in PLAYERS {
        let result = Command::new(player)
            .args(*args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match result {
            Ok(child) => {
                tracing::debug!("Playing {} with {}", path.display(), player);
                return Ok(child);
            }
            Err(e) => tracing::debug!("Player {} unavailable: {e}", player),
        }
    }

    Err(anyhow!(
        "No audio player found. Install one of: {}",
        PLAYERS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

#[cfg(target_os = "windows")]
fn spawn_player(path: &Path) -> Result<Child> {
    let script = format!(
        "(New-Object Media.SoundPlayer '{}').PlaySync()",
        path.display().to_string().replace('\'', "''")
    );
    Command::new("powershell")
        .args(["-NoProfile", "-Command", &script])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| anyhow!("Failed to start audio player: {e}"))
}
