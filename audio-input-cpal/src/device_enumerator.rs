//! Input device enumeration through the cpal default host.

use cpal::traits::{DeviceTrait, HostTrait};

use audio_input_core::models::audio_models::AudioSource;
use audio_input_core::models::error::CaptureError;

/// List every input device of the default host.
pub fn list_input_devices() -> Result<Vec<AudioSource>, CaptureError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::Device(format!("failed to enumerate input devices: {}", e)))?;

    let sources = devices
        .filter_map(|device| device.name().ok())
        .map(|name| AudioSource {
            id: name.clone(),
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
        })
        .collect();
    Ok(sources)
}

/// Find an input device by name, or the default input device for `None`.
pub fn resolve_device(name: Option<&str>) -> Result<cpal::Device, CaptureError> {
    let host = cpal::default_host();
    log::debug!("Audio host: {:?}", host.id());

    match name {
        Some(name) => host
            .input_devices()
            .map_err(|e| CaptureError::Device(format!("failed to enumerate input devices: {}", e)))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| {
                log::warn!("Input device '{}' not found", name);
                CaptureError::DeviceNotAvailable
            }),
        None => host
            .default_input_device()
            .ok_or(CaptureError::DeviceNotAvailable),
    }
}
