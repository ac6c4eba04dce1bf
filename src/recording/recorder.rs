//! Recording state machine.
//!
//! A [`Recorder`] is either idle or capturing into one file. Capture itself is
//! delegated to the [`Host`]; when a capture stops the file gets the configured
//! gain applied and becomes the "last recording" that can be played back.

use super::amplify::amplify_in_place;
use crate::config::{Settings, SettingsStore};
use crate::host::Host;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Why a recorder operation did not happen.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("No collection is open.")]
    NoCollection,
    #[error("No audio input device available.")]
    NoInputDevice,
    #[error("A recording is already in progress.")]
    AlreadyRecording,
    #[error("No recording is in progress.")]
    NotRecording,
    #[error("No recording available yet.")]
    NoRecording,
    #[error("Last recording file is missing.")]
    MissingFile(PathBuf),
    #[error("Recording failed: {0}")]
    Capture(anyhow::Error),
    #[error("Playback failed: {0}")]
    Playback(anyhow::Error),
}

impl RecorderError {
    /// Whether the user should see this as a warning.
    ///
    /// Starting while recording and stopping while idle are silent no-ops.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::AlreadyRecording | Self::NotRecording)
    }
}

enum RecorderState<C> {
    Idle,
    Recording {
        capture: C,
        path: PathBuf,
        started_at: Instant,
    },
}

/// Start/stop state of the microphone recorder plus the last finished recording.
pub struct Recorder<C> {
    state: RecorderState<C>,
    last_path: Option<PathBuf>,
}

impl<C> Default for Recorder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Recorder<C> {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            last_path: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording { .. })
    }

    /// Path of the most recently completed recording.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }

    /// Path of the recording in progress.
    pub fn pending_path(&self) -> Option<&Path> {
        match &self.state {
            RecorderState::Recording { path, .. } => Some(path),
            RecorderState::Idle => None,
        }
    }

    /// Time since the recording in progress started.
    pub fn elapsed(&self) -> Option<Duration> {
        match &self.state {
            RecorderState::Recording { started_at, .. } => Some(started_at.elapsed()),
            RecorderState::Idle => None,
        }
    }

    /// Starts a new recording in the configured save folder.
    ///
    /// # Errors
    /// - `AlreadyRecording` if a recording is in progress
    /// - `NoCollection` / `NoInputDevice` if the host cannot record
    /// - `Capture` if the save folder cannot be created or capture fails to start
    pub fn start<H, S>(
        &mut self,
        host: &mut H,
        settings: &mut Settings<S>,
    ) -> Result<PathBuf, RecorderError>
    where
        H: Host<Capture = C>,
        S: SettingsStore,
    {
        if self.is_recording() {
            return Err(RecorderError::AlreadyRecording);
        }
        let media_dir = host.media_dir().ok_or(RecorderError::NoCollection)?;
        if !host.has_input_device() {
            return Err(RecorderError::NoInputDevice);
        }

        let save_dir = settings.save_dir(&media_dir);
        std::fs::create_dir_all(&save_dir).map_err(|e| {
            RecorderError::Capture(anyhow::anyhow!(
                "Cannot create folder {}: {e}",
                save_dir.display()
            ))
        })?;
        let path = recording_path(&save_dir, Local::now());

        let capture = host.begin_capture(&path).map_err(RecorderError::Capture)?;
        tracing::info!("Recording started: {}", path.display());

        self.state = RecorderState::Recording {
            capture,
            path: path.clone(),
            started_at: Instant::now(),
        };
        Ok(path)
    }

    /// Stops the recording in progress and applies the configured gain to it.
    ///
    /// # Errors
    /// - `NotRecording` if the recorder is idle
    /// - `Capture` if the host fails to finish the file; the recorder is idle afterwards
    pub fn stop<H, S>(
        &mut self,
        host: &mut H,
        settings: &mut Settings<S>,
    ) -> Result<PathBuf, RecorderError>
    where
        H: Host<Capture = C>,
        S: SettingsStore,
    {
        let (capture, path, started_at) =
            match std::mem::replace(&mut self.state, RecorderState::Idle) {
                RecorderState::Recording {
                    capture,
                    path,
                    started_at,
                } => (capture, path, started_at),
                RecorderState::Idle => return Err(RecorderError::NotRecording),
            };

        host.end_capture(capture).map_err(|e| {
            tracing::error!("Failed to finish recording {}: {e}", path.display());
            RecorderError::Capture(e)
        })?;
        tracing::info!(
            "Recording stopped after {:.1}s: {}",
            started_at.elapsed().as_secs_f32(),
            path.display()
        );

        amplify_in_place(&path, settings.gain());
        self.last_path = Some(path.clone());
        Ok(path)
    }

    /// Starts when idle, stops when recording.
    ///
    /// # Errors
    /// - Whatever [`Recorder::start`] or [`Recorder::stop`] returns
    pub fn toggle<H, S>(
        &mut self,
        host: &mut H,
        settings: &mut Settings<S>,
    ) -> Result<Toggled, RecorderError>
    where
        H: Host<Capture = C>,
        S: SettingsStore,
    {
        if self.is_recording() {
            self.stop(host, settings).map(Toggled::Stopped)
        } else {
            self.start(host, settings).map(Toggled::Started)
        }
    }

    /// Plays the last completed recording.
    ///
    /// # Errors
    /// - `NoRecording` if nothing has been recorded in this session
    /// - `MissingFile` if the file was removed since
    /// - `Playback` if the host cannot play it
    pub fn play_last<H>(&self, host: &mut H) -> Result<PathBuf, RecorderError>
    where
        H: Host<Capture = C>,
    {
        let path = self.last_path.as_ref().ok_or(RecorderError::NoRecording)?;
        if !path.exists() {
            return Err(RecorderError::MissingFile(path.clone()));
        }
        host.play(path).map_err(RecorderError::Playback)?;
        tracing::info!("Playing {}", path.display());
        Ok(path.clone())
    }
}

/// Outcome of [`Recorder::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled {
    Started(PathBuf),
    Stopped(PathBuf),
}

/// File name for a recording started at `at`: `voice_YYYYMMDD_HHMMSS.wav`.
pub fn recording_path(save_dir: &Path, at: DateTime<Local>) -> PathBuf {
    save_dir.join(format!("voice_{}.wav", at.format("%Y%m%d_%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::MemoryStore;
    use crate::config::RecorderConfig;
    use crate::host::testing::ScriptedHost;
    use chrono::TimeZone;
    use hound::WavReader;

    fn settings_with_gain(gain: f64) -> Settings<MemoryStore> {
        let mut config = RecorderConfig::default();
        config.gain = toml::Value::Float(gain);
        Settings::new(MemoryStore::with_config(config))
    }

    fn is_recording_name(path: &Path) -> bool {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        name.len() == "voice_20240101_120000.wav".len()
            && name.starts_with("voice_")
            && name.ends_with(".wav")
            && name.as_bytes()[14] == b'_'
            && name[6..14].chars().all(|c| c.is_ascii_digit())
            && name[15..21].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_recording_path_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(
            recording_path(Path::new("/media"), at),
            PathBuf::from("/media/voice_20240307_090502.wav")
        );
    }

    #[test]
    fn test_record_cycle_applies_gain() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        let mut settings = settings_with_gain(2.0);
        let mut recorder = Recorder::new();

        let path = recorder.start(&mut host, &mut settings).unwrap();
        assert!(recorder.is_recording());
        assert_eq!(recorder.pending_path(), Some(path.as_path()));
        assert_eq!(recorder.last_path(), None);

        let stopped = recorder.stop(&mut host, &mut settings).unwrap();
        assert_eq!(stopped, path);
        assert!(!recorder.is_recording());
        assert_eq!(recorder.last_path(), Some(path.as_path()));

        assert_eq!(path.parent(), Some(media.path()));
        assert!(is_recording_name(&path));

        let mut reader = WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 16000);
        assert!(samples.iter().all(|&s| s == 20000));
    }

    #[test]
    fn test_loud_recording_saturates() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        host.capture_samples = vec![20000, -20000, 100];
        let mut settings = settings_with_gain(2.0);
        let mut recorder = Recorder::new();

        recorder.start(&mut host, &mut settings).unwrap();
        let path = recorder.stop(&mut host, &mut settings).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![32767, -32768, 200]);
    }

    #[test]
    fn test_configured_save_dir_is_created() {
        let media = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let save_dir = target.path().join("voice").join("clips");

        let mut config = RecorderConfig::default();
        config.save_dir = save_dir.to_string_lossy().into_owned();
        let mut settings = Settings::new(MemoryStore::with_config(config));
        let mut host = ScriptedHost::with_collection(media.path());
        let mut recorder = Recorder::new();

        let path = recorder.start(&mut host, &mut settings).unwrap();
        assert!(save_dir.is_dir());
        assert_eq!(path.parent(), Some(save_dir.as_path()));
    }

    #[test]
    fn test_start_while_recording_is_rejected() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        let mut settings = settings_with_gain(1.0);
        let mut recorder = Recorder::new();

        let first = recorder.start(&mut host, &mut settings).unwrap();
        let second = recorder.start(&mut host, &mut settings);

        assert!(matches!(second, Err(RecorderError::AlreadyRecording)));
        assert!(!second.unwrap_err().is_user_facing());
        assert_eq!(host.captures_begun, vec![first.clone()]);
        assert_eq!(recorder.pending_path(), Some(first.as_path()));
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        let mut settings = settings_with_gain(1.0);
        let mut recorder: Recorder<PathBuf> = Recorder::new();

        let result = recorder.stop(&mut host, &mut settings);
        assert!(matches!(result, Err(RecorderError::NotRecording)));
        assert!(host.captures_ended.is_empty());
        assert_eq!(recorder.last_path(), None);
    }

    #[test]
    fn test_start_requires_collection_and_device() {
        let media = tempfile::tempdir().unwrap();
        let mut settings = settings_with_gain(1.0);
        let mut recorder = Recorder::new();

        let mut closed = ScriptedHost::with_collection(media.path());
        closed.media_dir = None;
        let err = recorder.start(&mut closed, &mut settings).unwrap_err();
        assert!(matches!(err, RecorderError::NoCollection));
        assert_eq!(err.to_string(), "No collection is open.");

        let mut deaf = ScriptedHost::with_collection(media.path());
        deaf.input_device = false;
        let err = recorder.start(&mut deaf, &mut settings).unwrap_err();
        assert!(matches!(err, RecorderError::NoInputDevice));

        assert!(!recorder.is_recording());
        assert!(closed.captures_begun.is_empty());
        assert!(deaf.captures_begun.is_empty());
    }

    #[test]
    fn test_failed_capture_stays_idle() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        host.fail_capture = true;
        let mut settings = settings_with_gain(1.0);
        let mut recorder = Recorder::new();

        let err = recorder.start(&mut host, &mut settings).unwrap_err();
        assert!(matches!(err, RecorderError::Capture(_)));
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_toggle_alternates() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        let mut settings = settings_with_gain(1.0);
        let mut recorder = Recorder::new();

        let path = match recorder.toggle(&mut host, &mut settings).unwrap() {
            Toggled::Started(path) => path,
            other => panic!("expected start, got {other:?}"),
        };
        assert_eq!(
            recorder.toggle(&mut host, &mut settings).unwrap(),
            Toggled::Stopped(path)
        );
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_play_last_before_any_recording() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        let recorder: Recorder<PathBuf> = Recorder::new();

        let err = recorder.play_last(&mut host).unwrap_err();
        assert!(matches!(err, RecorderError::NoRecording));
        assert_eq!(err.to_string(), "No recording available yet.");
        assert!(host.played.is_empty());
    }

    #[test]
    fn test_play_last_missing_file() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        let mut settings = settings_with_gain(1.0);
        let mut recorder = Recorder::new();

        recorder.start(&mut host, &mut settings).unwrap();
        let path = recorder.stop(&mut host, &mut settings).unwrap();
        std::fs::remove_file(&path).unwrap();

        let err = recorder.play_last(&mut host).unwrap_err();
        assert!(matches!(err, RecorderError::MissingFile(_)));
        assert!(host.played.is_empty());
    }

    #[test]
    fn test_play_last_plays_during_next_recording() {
        let media = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::with_collection(media.path());
        let mut settings = settings_with_gain(1.0);
        let mut recorder = Recorder::new();

        recorder.start(&mut host, &mut settings).unwrap();
        let first = recorder.stop(&mut host, &mut settings).unwrap();
        recorder.start(&mut host, &mut settings).unwrap();

        assert_eq!(recorder.play_last(&mut host).unwrap(), first);
        assert_eq!(host.played, vec![first]);
    }
}
