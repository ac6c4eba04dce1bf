//! Post-recording gain.
//!
//! Rewrites a finished PCM WAV file with every sample multiplied by a gain factor.
//! The format (channels, sample rate, sample width, sample format) is carried over
//! unchanged. Integer samples saturate at the limits of their width instead of
//! wrapping around; float samples saturate at full scale.

use anyhow::{anyhow, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};

/// Summary of one amplification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmplifyReport {
    /// Number of samples rewritten (all channels)
    pub samples: usize,
    /// Number of samples that hit the limit of the sample width
    pub clipped: usize,
}

/// Applies `gain` to the WAV file at `path`, logging instead of failing.
///
/// A missing file is a logged no-op. Any read, format or write failure leaves the
/// original file untouched and is reported on the log only.
pub fn amplify_in_place(path: &Path, gain: f64) -> Option<AmplifyReport> {
    if !path.exists() {
        tracing::warn!("Skipping gain, recording not found: {}", path.display());
        return None;
    }

    match amplify_wav(path, gain) {
        Ok(report) => {
            tracing::info!(
                "Applied gain {:.2} to {} ({} samples, {} clipped)",
                gain,
                path.display(),
                report.samples,
                report.clipped
            );
            Some(report)
        }
        Err(e) => {
            tracing::error!("Gain failed for {}: {e}", path.display());
            None
        }
    }
}

/// Applies `gain` to the WAV file at `path`, replacing it.
///
/// The scaled audio is written to a sibling temporary file which is then renamed
/// over the original, so a failure never leaves a half-written recording behind.
///
/// # Errors
/// - If the file cannot be read or is not a PCM WAV file
/// - If the sample format is not supported
/// - If the scaled file cannot be written or moved into place
pub fn amplify_wav(path: &Path, gain: f64) -> Result<AmplifyReport> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    tracing::debug!(
        "Amplifying {}: {} channels, {}Hz, {} bits {:?}",
        path.display(),
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format
    );

    let temp_path = temp_path_for(path);
    let result = match spec.sample_format {
        SampleFormat::Int => {
            let (min, max) = int_range(spec.bits_per_sample)?;
            let samples = reader.samples::<i32>().collect::<Result<Vec<_>, _>>()?;
            drop(reader);
            let mut clipped = 0;
            let scaled: Vec<i32> = samples
                .iter()
                .map(|&sample| {
                    let (value, hit_limit) = scale_int(sample, gain, min, max);
                    clipped += usize::from(hit_limit);
                    value
                })
                .collect();
            write_samples(&temp_path, spec, &scaled).map(|()| AmplifyReport {
                samples: scaled.len(),
                clipped,
            })
        }
        SampleFormat::Float => {
            if spec.bits_per_sample != 32 {
                return Err(anyhow!(
                    "Unsupported float sample width: {} bits",
                    spec.bits_per_sample
                ));
            }
            let samples = reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?;
            drop(reader);
            let mut clipped = 0;
            let scaled: Vec<f32> = samples
                .iter()
                .map(|&sample| {
                    let (value, hit_limit) = scale_float(sample, gain);
                    clipped += usize::from(hit_limit);
                    value
                })
                .collect();
            write_samples(&temp_path, spec, &scaled).map(|()| AmplifyReport {
                samples: scaled.len(),
                clipped,
            })
        }
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(anyhow!("Failed to replace {}: {e}", path.display()));
    }

    Ok(report)
}

/// Representable range of a signed integer sample of the given width.
fn int_range(bits_per_sample: u16) -> Result<(i64, i64)> {
    match bits_per_sample {
        8 | 16 | 24 | 32 => {
            let half = 1i64 << (bits_per_sample - 1);
            Ok((-half, half - 1))
        }
        other => Err(anyhow!("Unsupported integer sample width: {other} bits")),
    }
}

/// Scales one integer sample, saturating at `min..=max`.
///
/// The product is clamped first and then floored, so results match an integer
/// multiply that rounds towards negative infinity. Returns whether the limit was hit.
fn scale_int(sample: i32, gain: f64, min: i64, max: i64) -> (i32, bool) {
    let product = f64::from(sample) * gain;
    let hit_limit = product > max as f64 || product < min as f64;
    let value = product.clamp(min as f64, max as f64).floor() as i64;
    (value as i32, hit_limit)
}

fn scale_float(sample: f32, gain: f64) -> (f32, bool) {
    let product = f64::from(sample) * gain;
    let hit_limit = !(-1.0..=1.0).contains(&product);
    (product.clamp(-1.0, 1.0) as f32, hit_limit)
}

fn write_samples<S: hound::Sample + Copy>(path: &Path, spec: WavSpec, samples: &[S]) -> Result<()> {
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".gain.tmp");
    path.with_file_name(name)
}
