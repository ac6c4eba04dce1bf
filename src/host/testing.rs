//! Scripted host for exercising the recorder and command handlers.

use super::Host;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub const CAPTURE_SPEC: WavSpec = WavSpec {
    channels: 1,
    sample_rate: 16000,
    bits_per_sample: 16,
    sample_format: SampleFormat::Int,
};

/// Host that records every call and answers prompts from a script.
///
/// Ending a capture writes `capture_samples` to the capture path as a 16-bit
/// mono WAV file, standing in for the microphone.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    pub media_dir: Option<PathBuf>,
    pub input_device: bool,
    pub fail_capture: bool,
    pub capture_samples: Vec<i16>,
    pub captures_begun: Vec<PathBuf>,
    pub captures_ended: Vec<PathBuf>,
    pub played: Vec<PathBuf>,
    pub folder_answers: VecDeque<Option<PathBuf>>,
    pub text_answers: VecDeque<Option<String>>,
    pub text_prompts: Vec<(String, String)>,
    pub warnings: Vec<String>,
    pub notifications: Vec<String>,
}

impl ScriptedHost {
    /// Host with an open collection whose media folder is `media_dir` and a working microphone.
    pub fn with_collection(media_dir: &Path) -> Self {
        Self {
            media_dir: Some(media_dir.to_path_buf()),
            input_device: true,
            capture_samples: vec![10000; 16000],
            ..Self::default()
        }
    }
}

impl Host for ScriptedHost {
    type Capture = PathBuf;

    fn media_dir(&self) -> Option<PathBuf> {
        self.media_dir.clone()
    }

    fn has_input_device(&self) -> bool {
        self.input_device
    }

    fn begin_capture(&mut self, path: &Path) -> anyhow::Result<PathBuf> {
        if self.fail_capture {
            anyhow::bail!("capture device busy");
        }
        self.captures_begun.push(path.to_path_buf());
        Ok(path.to_path_buf())
    }

    fn end_capture(&mut self, capture: PathBuf) -> anyhow::Result<()> {
        let mut writer = WavWriter::create(&capture, CAPTURE_SPEC)?;
        for &sample in &self.capture_samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        self.captures_ended.push(capture);
        Ok(())
    }

    fn play(&mut self, path: &Path) -> anyhow::Result<()> {
        self.played.push(path.to_path_buf());
        Ok(())
    }

    fn prompt_folder(&mut self, _title: &str, _current: &Path) -> Option<PathBuf> {
        self.folder_answers.pop_front().flatten()
    }

    fn prompt_text(&mut self, _title: &str, prompt: &str, default: &str) -> Option<String> {
        self.text_prompts.push((prompt.to_string(), default.to_string()));
        self.text_answers.pop_front().flatten()
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}
