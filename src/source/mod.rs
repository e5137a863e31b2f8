//! Audio sources that drive a scope buffer's writer.
//!
//! [`AudioDevice`] wraps a CPAL input device whose callback writes into the
//! buffer. [`MockSource`] generates synthetic audio for tests and demos.

mod device;
mod mock;

pub use device::{AudioDevice, CaptureStream};
pub use mock::{MockProducer, MockSource};

use cpal::traits::{DeviceTrait, HostTrait};

/// Lists all available input devices.
///
/// # Errors
///
/// Returns an error if the audio host cannot be accessed.
pub fn list_input_devices() -> Result<Vec<String>, crate::ScopeError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| crate::ScopeError::BackendError(e.to_string()))?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Gets the name of the default input device, if any.
pub fn default_input_device_name() -> Option<String> {
    cpal::default_host()
        .default_input_device()
        .and_then(|d| d.name().ok())
}
