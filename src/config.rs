//! Configuration types for scope buffers and frame pumps.

use std::time::Duration;

use crate::ScopeError;

/// Read window presets for common visualizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopePreset {
    /// 256 samples per frame - enough for a smooth waveform trace.
    #[default]
    Oscilloscope,

    /// 1024 samples per frame - one FFT frame of order 10.
    Spectrum,

    /// An explicit read window, in samples per channel.
    Custom(usize),
}

impl ScopePreset {
    /// Samples per channel read on every frame.
    #[must_use]
    pub fn read_size(&self) -> usize {
        match self {
            Self::Oscilloscope => 256,
            Self::Spectrum => 1024,
            Self::Custom(n) => *n,
        }
    }
}

/// Geometry of a ring buffer sized for a given callback block and read
/// window.
///
/// Use [`BufferConfig::default()`] for stereo with 512-frame callbacks, or
/// customize as needed.
///
/// # Example
///
/// ```
/// use scopebuf::{BufferConfig, ScopePreset};
///
/// let config = BufferConfig {
///     block_size: 1024,
///     ..Default::default()
/// }
/// .with_preset(ScopePreset::Spectrum);
///
/// assert_eq!(config.capacity(), 10 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Number of channels to store.
    ///
    /// Default: 2
    pub channels: usize,

    /// Largest block the audio callback is expected to deliver, in frames.
    ///
    /// Default: 512
    pub block_size: usize,

    /// Capacity expressed as a multiple of `block_size`.
    ///
    /// Default: 10
    pub headroom_blocks: usize,

    /// Samples per channel each consumer reads per frame.
    ///
    /// Default: 256 ([`ScopePreset::Oscilloscope`])
    pub read_size: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            block_size: 512,
            headroom_blocks: 10,
            read_size: ScopePreset::Oscilloscope.read_size(),
        }
    }
}

impl BufferConfig {
    /// Sets the read window from a preset.
    #[must_use]
    pub fn with_preset(mut self, preset: ScopePreset) -> Self {
        self.read_size = preset.read_size();
        self
    }

    /// Ring capacity in samples per channel.
    ///
    /// At least `headroom_blocks` callback blocks, and always large enough
    /// that one block plus one read window leave a free sample between them.
    #[must_use]
    pub fn capacity(&self) -> usize {
        let headroom = self.block_size.saturating_mul(self.headroom_blocks);
        let minimum = self
            .block_size
            .saturating_add(self.read_size)
            .saturating_add(1);
        headroom.max(minimum)
    }

    /// Checks that the configuration describes a usable buffer.
    pub fn validate(&self) -> Result<(), ScopeError> {
        if self.channels == 0 {
            return Err(ScopeError::InvalidChannelCount {
                channels: self.channels,
            });
        }
        if self.block_size == 0 {
            return Err(ScopeError::invalid_config("block_size must be greater than zero"));
        }
        if self.headroom_blocks == 0 {
            return Err(ScopeError::invalid_config(
                "headroom_blocks must be greater than zero",
            ));
        }
        if self.read_size >= self.capacity() {
            return Err(ScopeError::ReadTooLarge {
                requested: self.read_size,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }
}

/// Default consumer cadence: one read per 60 Hz video frame.
const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Configuration for a [`FramePump`](crate::FramePump).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpConfig {
    /// Samples per channel read on every frame.
    ///
    /// Default: 256
    pub read_size: usize,

    /// Time between reads.
    ///
    /// Default: 1/60 s
    pub frame_interval: Duration,

    /// Frames buffered for the consumer before new ones are dropped.
    ///
    /// Default: 4
    pub frame_capacity: usize,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            read_size: ScopePreset::Oscilloscope.read_size(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            frame_capacity: 4,
        }
    }
}

impl PumpConfig {
    /// Creates a pump configuration reading `read_size` samples `fps` times
    /// per second.
    ///
    /// A zero `fps` falls back to the 60 Hz default.
    #[must_use]
    pub fn from_frame_rate(read_size: usize, fps: u32) -> Self {
        let frame_interval = if fps == 0 {
            DEFAULT_FRAME_INTERVAL
        } else {
            Duration::from_secs_f64(1.0 / f64::from(fps))
        };
        Self {
            read_size,
            frame_interval,
            ..Default::default()
        }
    }
}
