//! Apply gain to an existing recording.

use crate::config::{clamp_gain, Settings, TomlStore};
use crate::recording::{amplify_wav, AmplifyReport};
use console::style;
use std::path::{Path, PathBuf};

/// Rewrites `file` with every sample scaled by `gain`, or by the configured gain.
///
/// Unlike the gain pass after a recording, failures are reported to the caller.
///
/// # Errors
/// - If the file cannot be read as a PCM WAV file
/// - If the amplified file cannot be written
pub fn handle_amplify(file: PathBuf, gain: Option<f64>) -> anyhow::Result<()> {
    let gain = match gain {
        Some(gain) => clamp_gain(gain),
        None => Settings::new(TomlStore::from_default_location()?).gain(),
    };
    tracing::info!("Amplifying {} with gain {gain}", file.display());

    let report = amplify_wav(&file, gain)?;
    println!("{}", summary(&file, gain, &report));
    Ok(())
}

fn summary(file: &Path, gain: f64, report: &AmplifyReport) -> String {
    let mut line = format!(
        "{} {} ({} samples, gain {gain:.2})",
        style("Amplified").green().bold(),
        file.display(),
        report.samples
    );
    if report.clipped > 0 {
        line.push_str(&format!(
            ", {}",
            style(format!("{} clipped", report.clipped)).yellow()
        ));
    }
    line
}
