//! CPAL device wrapper feeding a scope buffer.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SizedSample, Stream, StreamConfig as CpalStreamConfig};

use crate::buffer::{RingBuffer, ScopeReader, ScopeWriter};
use crate::event::EventCallback;
use crate::format::{i16_to_f32, i32_to_f32, u16_to_f32};
use crate::{BufferConfig, ScopeError, ScopeEvent};

/// Wrapper around a CPAL audio input device.
///
/// The device's audio callback becomes the scope buffer's single writer:
/// each delivered block is written straight into the ring, converted to
/// f32, without locking or allocating.
#[must_use]
pub struct AudioDevice {
    device: Device,
}

impl AudioDevice {
    /// Opens the default input device.
    ///
    /// # Errors
    ///
    /// Returns `NoDefaultDevice` if no default input device is configured.
    pub fn open_default() -> Result<Self, ScopeError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(ScopeError::NoDefaultDevice)?;

        Ok(Self { device })
    }

    /// Opens a specific input device by name.
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` if no device with the given name exists.
    pub fn open_by_name(name: &str) -> Result<Self, ScopeError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| ScopeError::BackendError(e.to_string()))?;

        for device in devices {
            if device.name().is_ok_and(|device_name| device_name == name) {
                return Ok(Self { device });
            }
        }

        Err(ScopeError::DeviceNotFound {
            name: name.to_string(),
        })
    }

    /// Returns the device name.
    pub fn name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "unknown".to_string())
    }

    /// Returns the device's native capture format (sample rate, channels).
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the device can't report a configuration.
    pub fn native_config(&self) -> Result<(u32, u16), ScopeError> {
        let config = self
            .device
            .default_input_config()
            .map_err(|e| ScopeError::BackendError(e.to_string()))?;
        Ok((config.sample_rate().0, config.channels()))
    }

    /// Starts capturing into a new scope buffer and returns the running
    /// stream with a reader of that buffer.
    ///
    /// The buffer's channel count follows the device's native channel count;
    /// every other dimension comes from `config`. The returned
    /// [`CaptureStream`] must be kept alive for capture to continue.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the device format
    /// is unsupported, or the stream cannot be built or started.
    pub fn start_capture(
        &self,
        config: &BufferConfig,
        event_callback: Option<EventCallback>,
    ) -> Result<(CaptureStream, ScopeReader<f32>), ScopeError> {
        let supported_config = self
            .device
            .default_input_config()
            .map_err(|e| ScopeError::BackendError(e.to_string()))?;

        let sample_format = supported_config.sample_format();
        let cpal_config: CpalStreamConfig = supported_config.into();
        let channels = usize::from(cpal_config.channels);

        if channels != config.channels {
            tracing::info!(
                configured = config.channels,
                native = channels,
                "capturing at the device's native channel count"
            );
        }
        let config = BufferConfig {
            channels,
            ..config.clone()
        };
        config.validate()?;

        let (writer, reader) = RingBuffer::<f32>::try_new(channels, config.capacity())?.split();

        let stream = match sample_format {
            SampleFormat::F32 => {
                self.build_stream::<f32>(&cpal_config, writer, std::convert::identity, event_callback)?
            }
            SampleFormat::I16 => {
                self.build_stream::<i16>(&cpal_config, writer, i16_to_f32, event_callback)?
            }
            SampleFormat::I32 => {
                self.build_stream::<i32>(&cpal_config, writer, i32_to_f32, event_callback)?
            }
            SampleFormat::U16 => {
                self.build_stream::<u16>(&cpal_config, writer, u16_to_f32, event_callback)?
            }
            format => {
                return Err(ScopeError::UnsupportedFormat {
                    format: format!("{format:?}"),
                });
            }
        };

        stream
            .play()
            .map_err(|e| ScopeError::BackendError(e.to_string()))?;

        tracing::info!(
            device = %self.name(),
            sample_rate = cpal_config.sample_rate.0,
            channels,
            capacity = reader.capacity(),
            ?sample_format,
            "capture started"
        );

        Ok((
            CaptureStream {
                _stream: stream,
                sample_rate: cpal_config.sample_rate.0,
                channels: cpal_config.channels,
            },
            reader,
        ))
    }

    fn build_stream<S>(
        &self,
        config: &CpalStreamConfig,
        mut writer: ScopeWriter<f32>,
        convert: fn(S) -> f32,
        event_callback: Option<EventCallback>,
    ) -> Result<Stream, ScopeError>
    where
        S: SizedSample + 'static,
    {
        let stream = self
            .device
            .build_input_stream(
                config,
                move |data: &[S], _: &cpal::InputCallbackInfo| {
                    writer.write_interleaved_with(data, convert);
                },
                move |err| {
                    tracing::error!("Audio stream error: {}", err);
                    if let Some(ref callback) = event_callback {
                        callback(ScopeEvent::StreamError {
                            reason: err.to_string(),
                        });
                    }
                },
                None,
            )
            .map_err(|e| ScopeError::BackendError(e.to_string()))?;

        Ok(stream)
    }
}

/// A running audio capture stream.
///
/// Audio capture continues while this struct is held. When dropped, the CPAL
/// stream is stopped and its callback, the buffer's writer, is released.
pub struct CaptureStream {
    /// The underlying CPAL stream. Dropping this stops capture.
    _stream: Stream,
    sample_rate: u32,
    channels: u16,
}

impl CaptureStream {
    /// Sample rate the device is capturing at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channels delivered by the device.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}
