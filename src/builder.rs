//! Builder pattern for `Scope`.

use tokio::sync::mpsc;

use crate::buffer::ScopeReader;
use crate::pipeline::{spawn_frame_pump, PumpHandle};
use crate::session::ScopeSession;
use crate::source::AudioDevice;
use crate::{
    event_callback, BufferConfig, EventCallback, PumpConfig, Sample, ScopeError, ScopeEvent,
    ScopePreset, Snapshot,
};

/// Frames buffered for the consumer by default.
const DEFAULT_FRAME_CAPACITY: usize = 4;

/// Specifies which audio input device to use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum DeviceSelection {
    /// Use the system's default input device.
    #[default]
    SystemDefault,
    /// Use a specific device by name.
    ByName(String),
}

/// Entry point for building a scope.
///
/// See [`Scope::builder()`].
pub struct Scope;

impl Scope {
    /// Creates a new builder with default settings.
    pub fn builder() -> ScopeBuilder {
        ScopeBuilder::new()
    }
}

/// Builder for configuring and starting a scope.
///
/// Use [`Scope::builder()`] to create a new builder.
///
/// # Hardware Example
///
/// ```ignore
/// use scopebuf::{Scope, ScopePreset};
///
/// let (session, mut frames) = Scope::builder()
///     .device("MacBook Pro Microphone")
///     .preset(ScopePreset::Spectrum)
///     .frame_rate(30)
///     .on_event(|e| tracing::warn!(?e, "scope event"))
///     .start()
///     .await?;
///
/// while let Some(frame) = frames.recv().await {
///     println!("peak {:.3}", frame.peak());
/// }
/// ```
///
/// # Any Producer
///
/// ```
/// use scopebuf::{RingBuffer, Scope};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), scopebuf::ScopeError> {
/// let (mut writer, reader) = RingBuffer::<f32>::new(2, 4096).split();
/// let (pump, mut frames) = Scope::builder().start_with_reader(reader)?;
///
/// writer.write_interleaved(&[0.5; 1024]);
/// let frame = frames.recv().await.unwrap();
/// assert_eq!(frame.len(), 256);
///
/// pump.stop().await;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct ScopeBuilder {
    device: DeviceSelection,
    config: BufferConfig,
    preset: Option<ScopePreset>,
    frame_rate: Option<u32>,
    frame_capacity: usize,
    event_callback: Option<EventCallback>,
}

impl Default for ScopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            device: DeviceSelection::SystemDefault,
            config: BufferConfig::default(),
            preset: None,
            frame_rate: None,
            frame_capacity: DEFAULT_FRAME_CAPACITY,
            event_callback: None,
        }
    }

    /// Capture from a specific input device by name.
    ///
    /// Default: the system's default input device.
    pub fn device(mut self, name: impl Into<String>) -> Self {
        self.device = DeviceSelection::ByName(name.into());
        self
    }

    /// Set the buffer geometry.
    ///
    /// The channel count is replaced by the device's native count when
    /// capturing from hardware.
    pub fn config(mut self, config: BufferConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the read window from a preset.
    ///
    /// Takes precedence over the `read_size` of [`config()`](Self::config).
    pub fn preset(mut self, preset: ScopePreset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Set how many frames per second are delivered.
    ///
    /// Default: 60
    pub fn frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = Some(fps);
        self
    }

    /// Set how many undelivered frames may queue before new ones are dropped.
    ///
    /// Default: 4
    pub fn frame_capacity(mut self, capacity: usize) -> Self {
        self.frame_capacity = capacity;
        self
    }

    /// Set a callback to receive runtime events.
    ///
    /// Events include stream errors, writer stalls, and headroom warnings.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(ScopeEvent) + Send + Sync + 'static,
    {
        self.event_callback = Some(event_callback(callback));
        self
    }

    /// The buffer configuration after applying the preset.
    fn buffer_config(&self) -> BufferConfig {
        match self.preset {
            Some(preset) => self.config.clone().with_preset(preset),
            None => self.config.clone(),
        }
    }

    fn pump_config(&self) -> PumpConfig {
        let read_size = self.buffer_config().read_size;
        let mut config = match self.frame_rate {
            Some(fps) => PumpConfig::from_frame_rate(read_size, fps),
            None => PumpConfig {
                read_size,
                ..Default::default()
            },
        };
        config.frame_capacity = self.frame_capacity;
        config
    }

    fn open_device(&self) -> Result<AudioDevice, ScopeError> {
        match &self.device {
            DeviceSelection::SystemDefault => AudioDevice::open_default(),
            DeviceSelection::ByName(name) => AudioDevice::open_by_name(name),
        }
    }

    /// Start capturing from the selected device.
    ///
    /// Returns a [`ScopeSession`] that keeps capture alive and the receiver
    /// frames are delivered on.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The audio device cannot be opened or started
    /// - The device's sample format is unsupported
    #[allow(clippy::unused_async)]
    pub async fn start(
        self,
    ) -> Result<(ScopeSession, mpsc::Receiver<Snapshot<f32>>), ScopeError> {
        let config = self.buffer_config();
        config.validate()?;

        let device = self.open_device()?;
        let (capture, reader) = device.start_capture(&config, self.event_callback.clone())?;

        let (pump, frames) =
            spawn_frame_pump(reader.clone(), &self.pump_config(), self.event_callback)?;

        tracing::info!(
            device = %device.name(),
            channels = reader.channels(),
            capacity = reader.capacity(),
            read_size = config.read_size,
            "scope started"
        );

        Ok((ScopeSession::new(pump, reader, capture), frames))
    }

    /// Start delivering frames from an existing buffer.
    ///
    /// Use this with any producer: a [`MockSource`](crate::MockSource), a
    /// file decoder, or an audio callback you manage yourself. The device
    /// selection and buffer geometry are ignored; only the read window,
    /// frame rate, and frame capacity apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the read window doesn't fit the buffer or the
    /// frame capacity is zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start_with_reader<T: Sample>(
        self,
        reader: ScopeReader<T>,
    ) -> Result<(PumpHandle, mpsc::Receiver<Snapshot<T>>), ScopeError> {
        let pump_config = self.pump_config();
        tracing::debug!(
            read_size = pump_config.read_size,
            frame_interval = ?pump_config.frame_interval,
            "starting frame pump"
        );
        spawn_frame_pump(reader, &pump_config, self.event_callback)
    }
}
