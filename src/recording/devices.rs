//! Audio input device lookup.
//!
//! Devices are selected by the `[audio] device` setting: "default", a numeric
//! index or an exact device name as printed by `flashrec list-devices`.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Finds the configured input device.
///
/// # Errors
/// - If the default device is requested and none exists
/// - If no device with the specified name/index is found
pub fn find_input_device(device_spec: &str) -> Result<cpal::Device> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();

        if device_spec == "default" {
            host.default_input_device()
                .ok_or_else(|| anyhow!("No audio input device available"))
        } else {
            find_device_by_name(&host, device_spec)
        }
    })
}

/// Finds an audio input device by name or numeric index.
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    let devices: Vec<_> = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
        .collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            )
        });
    }

    devices
        .into_iter()
        .find(|device| device.name().is_ok_and(|name| name == device_spec))
        .ok_or_else(|| {
            anyhow!(
                "Audio input device '{device_spec}' not found. Use 'flashrec list-devices' to see available devices."
            )
        })
}

/// Description of one input device for listing.
#[derive(Debug, Clone)]
pub struct InputDeviceInfo {
    pub index: usize,
    pub name: String,
    pub is_default: bool,
    /// Native sample rate and channel count, when the device reports them
    pub config: Option<(u32, u16)>,
}

/// Enumerates input devices in the order used for numeric selection.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn list_input_devices() -> Result<Vec<InputDeviceInfo>> {
    let (default_name, devices) = suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());
        let devices: Vec<cpal::Device> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?
            .collect();
        Ok((default_name, devices))
    })?;

    Ok(devices
        .iter()
        .enumerate()
        .filter_map(|(index, device)| {
            let name = device.name().ok()?;
            let config = device
                .default_input_config()
                .ok()
                .map(|c| (c.sample_rate().0, c.channels()));
            Some(InputDeviceInfo {
                index,
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                config,
            })
        })
        .collect())
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    // Restore the original stderr
    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
