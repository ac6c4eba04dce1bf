//! List available audio input devices.

use crate::recording::devices::{list_input_devices, InputDeviceInfo};

/// Prints every audio input device with the index usable in `[audio] device`.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> anyhow::Result<()> {
    let devices = list_input_devices()?;

    if devices.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    println!();
    println!("Available audio input devices:");
    println!();
    for device in &devices {
        println!("{}", describe(device));
        println!();
    }
    println!("Set [audio] device in the config file to an ID or name.");

    Ok(())
}

fn describe(device: &InputDeviceInfo) -> String {
    let default_indicator = if device.is_default { " [DEFAULT]" } else { "" };
    let config_info = match device.config {
        Some((sample_rate, channels)) => format!("{sample_rate}Hz, {channels} channels"),
        None => "configuration unavailable".to_string(),
    };
    format!(
        "  ID: {}\n    Name: {}{}\n    Config: {}",
        device.index, device.name, default_indicator, config_info
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_device() {
        let device = InputDeviceInfo {
            index: 2,
            name: "USB Mic".to_string(),
            is_default: true,
            config: Some((48000, 1)),
        };
        assert_eq!(
            describe(&device),
            "  ID: 2\n    Name: USB Mic [DEFAULT]\n    Config: 48000Hz, 1 channels"
        );

        let device = InputDeviceInfo {
            config: None,
            is_default: false,
            ..device
        };
        assert!(describe(&device).ends_with("Name: USB Mic\n    Config: configuration unavailable"));
    }
}
