//! # scopebuf
//!
//! **Note:** This crate is under active development. The API may change before 1.0.
//!
//! Lock-free multi-channel scope buffer for real-time audio visualization.
//!
//! `scopebuf` bridges a real-time audio callback and any number of
//! visualizers. One writer appends blocks of samples into a fixed-capacity
//! circular buffer; readers on other threads copy out the most recent N
//! samples per channel whenever they want, without locks and without ever
//! making the writer wait.
//!
//! ## Quick Start
//!
//! ```rust
//! use scopebuf::RingBuffer;
//!
//! let (mut writer, reader) = RingBuffer::<f32>::new(2, 4096).split();
//!
//! // Audio thread: interleaved stereo from a device callback
//! writer.write_interleaved(&[0.25, -0.25, 0.5, -0.5]);
//!
//! // UI thread: the latest two frames, per channel
//! let frame = reader.read(2);
//! assert_eq!(frame.channel(0), Some(&[0.25, 0.5][..]));
//! assert_eq!(frame.channel(1), Some(&[-0.25, -0.5][..]));
//! ```
//!
//! ## Live Capture
//!
//! ```rust,ignore
//! use scopebuf::{Scope, ScopePreset};
//!
//! let (session, mut frames) = Scope::builder()
//!     .preset(ScopePreset::Oscilloscope)       // 256 samples per frame
//!     .frame_rate(60)
//!     .on_event(|e| tracing::warn!(?e, "scope event"))
//!     .start()
//!     .await?;
//!
//! while let Some(frame) = frames.recv().await {
//!     draw_waveform(frame.channel(0).unwrap());
//! }
//!
//! session.stop().await;
//! ```
//!
//! ## Architecture
//!
//! The crate maintains a strict thread boundary:
//!
//! - **Audio Thread**: The single writer. Stores samples and publishes the
//!   write cursor with release ordering; it never blocks or allocates
//! - **Scope Buffer**: Per-channel lanes of atomic sample slots plus one
//!   monotonic cursor, shared through `Arc`
//! - **Readers**: Any thread. Each read acquires the cursor once and copies
//!   the window ending there
//! - **Tokio Runtime**: An optional frame pump reads at a fixed rate and
//!   forwards snapshots over a bounded channel
//!
//! A reader that falls behind sees a window that ends at the cursor it
//! observed; stale, never torn, values are the only cost of racing the
//! writer.

#![warn(missing_docs)]
// Audio code requires intentional numeric casts between sample formats
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless
)]
// unwrap/expect allowed in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
// These doc lints are too strict for internal implementation details
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod buffer;
mod builder;
mod config;
mod error;
mod event;
pub mod format;
mod pipeline;
mod sample;
mod session;
mod snapshot;
pub mod source;

pub use buffer::{RingBuffer, ScopeReader, ScopeWriter};
pub use builder::{Scope, ScopeBuilder};
pub use config::{BufferConfig, PumpConfig, ScopePreset};
pub use error::ScopeError;
pub use event::{event_callback, EventCallback, ScopeEvent};
pub use pipeline::{spawn_frame_pump, FramePump, PumpHandle, PumpStats};
pub use sample::Sample;
pub use session::ScopeSession;
pub use snapshot::Snapshot;
pub use source::{
    default_input_device_name, list_input_devices, AudioDevice, CaptureStream, MockProducer,
    MockSource,
};
