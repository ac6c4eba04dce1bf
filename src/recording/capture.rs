//! Microphone capture to a PCM WAV file.
//!
//! Audio is captured from the configured input device at its native sample rate
//! and channel count, converted to 16-bit integer samples, buffered in memory and
//! written out as an uncompressed WAV file when the capture is finished.

use super::devices::find_input_device;
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use hound::WavWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// An in-progress microphone capture.
///
/// Dropping it without calling [`AudioCapture::finish`] discards the audio.
pub struct AudioCapture {
    /// Destination file
    path: PathBuf,
    /// Device sample rate
    sample_rate: u32,
    /// Device channel count; samples are stored interleaved
    channels: u16,
    /// Captured samples (i16 PCM, interleaved)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active audio input stream (kept alive during capture)
    stream: Option<cpal::Stream>,
}

impl AudioCapture {
    /// Starts capturing from `device_spec` for later writing to `path`.
    ///
    /// # Errors
    /// - If the specified device is not available
    /// - If device configuration fails
    /// - If audio stream creation fails
    pub fn start(device_spec: &str, path: &Path) -> Result<Self> {
        let device = find_input_device(device_spec)?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let device_config = device.default_input_config()?;
        let sample_rate = device_config.sample_rate().0;
        let channels = device_config.channels();
        let sample_format = device_config.sample_format();

        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            sample_rate,
            channels,
            sample_format
        );

        let samples = Arc::new(Mutex::new(Vec::new()));
        let stream_config: cpal::StreamConfig = device_config.into();

        let stream = match sample_format {
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, &samples)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, &samples)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, &samples)?,
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, &samples)?,
            other => return Err(anyhow!("Unsupported device sample format: {other:?}")),
        };

        stream.play()?;
        tracing::debug!("Audio stream started");

        Ok(Self {
            path: path.to_path_buf(),
            sample_rate,
            channels,
            samples,
            stream: Some(stream),
        })
    }

    /// Stops the stream and writes the captured audio to the destination file.
    ///
    /// An empty capture still produces a valid, empty WAV file.
    ///
    /// # Errors
    /// - If the WAV file cannot be created or written
    pub fn finish(mut self) -> Result<PathBuf> {
        // Dropping the stream stops the callback
        self.stream = None;

        let samples = std::mem::take(
            &mut *self
                .samples
                .lock()
                .map_err(|_| anyhow!("Capture buffer poisoned"))?,
        );

        let frames = samples.len() / usize::from(self.channels.max(1));
        if frames == 0 {
            tracing::warn!("Recording stopped with no samples captured");
        } else {
            tracing::info!(
                "Recording captured: {:.2}s ({} frames at {}Hz, {} channels)",
                frames as f32 / self.sample_rate as f32,
                frames,
                self.sample_rate,
                self.channels
            );
        }

        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&self.path, spec)?;
        for &sample in &samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        tracing::debug!("WAV written: {}", self.path.display());

        Ok(self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Converts a block of device samples to 16-bit PCM.
fn to_i16<T>(data: &[T]) -> impl Iterator<Item = i16> + '_
where
    T: Sample,
    i16: FromSample<T>,
{
    data.iter().map(|&s| i16::from_sample(s))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: &Arc<Mutex<Vec<i16>>>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let samples = Arc::clone(samples);
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            if let Ok(mut buffer) = samples.lock() {
                buffer.extend(to_i16(data));
            }
        },
        |err| {
            tracing::error!("Audio stream error: {}", err);
        },
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_samples_convert_to_i16() {
        let floats: Vec<i16> = to_i16(&[0.0f32, 0.5, -1.0]).collect();
        assert_eq!(floats, vec![0, 16384, -32768]);

        let unsigned: Vec<i16> = to_i16(&[32768u16]).collect();
        assert_eq!(unsigned, vec![0]);

        let native: Vec<i16> = to_i16(&[-7i16, 1200]).collect();
        assert_eq!(native, vec![-7, 1200]);
    }
}
