//! Error types for scopebuf.
//!
//! Errors are split into two categories:
//! - **Setup errors** ([`ScopeError`]): invalid geometry or configuration, and
//!   audio device failures. Returned from constructors, `try_*` operations and
//!   [`ScopeBuilder::start()`](crate::ScopeBuilder::start).
//! - **Runtime events**: stalls and headroom problems surfaced via
//!   [`EventCallback`](crate::EventCallback). These never interrupt capture.
//!
//! Contract violations on the hot path (reading a window at least as large as
//! the buffer, writing the wrong number of channels) panic with the
//! [`Display`](std::fmt::Display) text of the matching variant.

/// Errors returned by scopebuf setup and fallible buffer operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// A buffer must hold at least one channel.
    #[error("channel count must be greater than zero (got {channels})")]
    InvalidChannelCount {
        /// The rejected channel count.
        channels: usize,
    },

    /// A buffer must hold at least one sample per channel.
    #[error("capacity must be greater than zero (got {capacity})")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// A read window must be strictly smaller than the buffer capacity.
    #[error("read of {requested} samples does not fit a buffer of capacity {capacity}")]
    ReadTooLarge {
        /// Number of samples requested.
        requested: usize,
        /// Capacity of the buffer, in samples per channel.
        capacity: usize,
    },

    /// The caller supplied a different number of channel buffers than the
    /// ring holds.
    #[error("expected {expected} channel buffers, got {actual}")]
    ChannelCountMismatch {
        /// Channels held by the ring buffer.
        expected: usize,
        /// Channel buffers supplied by the caller.
        actual: usize,
    },

    /// A channel index beyond the ring's channel count.
    #[error("channel {channel} out of range for a {channels}-channel buffer")]
    ChannelOutOfRange {
        /// Requested channel index.
        channel: usize,
        /// Channels held by the ring buffer.
        channels: usize,
    },

    /// A caller buffer is shorter than the requested sample count.
    #[error("buffer for channel {channel} holds {actual} samples, {required} required")]
    BufferTooShort {
        /// Channel whose buffer was too short.
        channel: usize,
        /// Samples required.
        required: usize,
        /// Samples available.
        actual: usize,
    },

    /// A configuration value is unusable.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// The requested audio device was not found.
    #[error("device not found: {name}")]
    DeviceNotFound {
        /// Name of the device that wasn't found.
        name: String,
    },

    /// No default input device is configured on this system.
    #[error("no default input device configured")]
    NoDefaultDevice,

    /// The device's sample format cannot be written into the buffer.
    #[error("unsupported sample format: {format}")]
    UnsupportedFormat {
        /// The format that wasn't supported.
        format: String,
    },

    /// An error from the underlying audio library (CPAL).
    #[error("audio backend error: {0}")]
    BackendError(String),
}

impl ScopeError {
    /// Creates an invalid configuration error with the given reason.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
