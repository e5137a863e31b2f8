//! Live capture session management.

use crate::buffer::ScopeReader;
use crate::pipeline::{PumpHandle, PumpStats};
use crate::source::CaptureStream;

/// Handle to a running hardware scope.
///
/// The `ScopeSession` is returned by [`ScopeBuilder::start()`] and owns the
/// device stream (the buffer's writer) and the frame pump (one of its
/// readers). Both run until `stop()` is called or the session is dropped.
///
/// # Lifecycle
///
/// 1. Created by [`ScopeBuilder::start()`]
/// 2. The device callback writes, the pump delivers frames
/// 3. Call [`stop()`](ScopeSession::stop) for graceful shutdown
/// 4. Dropping the `ScopeSession` also stops capture and the pump
///
/// # Example
///
/// ```ignore
/// let (session, mut frames) = Scope::builder().start().await?;
///
/// while let Some(frame) = frames.recv().await {
///     draw(&frame);
/// }
///
/// session.stop().await;
/// ```
///
/// [`ScopeBuilder::start()`]: crate::ScopeBuilder::start
pub struct ScopeSession {
    pump: PumpHandle,
    reader: ScopeReader<f32>,
    // Keep the capture stream alive - dropping it stops CPAL
    capture: CaptureStream,
}

impl ScopeSession {
    pub(crate) fn new(pump: PumpHandle, reader: ScopeReader<f32>, capture: CaptureStream) -> Self {
        Self {
            pump,
            reader,
            capture,
        }
    }

    /// Returns `true` while frames are being delivered.
    pub fn is_running(&self) -> bool {
        self.pump.is_running()
    }

    /// Returns current frame pump statistics.
    pub fn stats(&self) -> PumpStats {
        self.pump.stats()
    }

    /// Total samples per channel the device has delivered.
    pub fn samples_written(&self) -> u64 {
        self.reader.samples_written()
    }

    /// Returns an extra reader of the session's buffer.
    ///
    /// Extra readers see the same windows as the pump and never disturb it.
    pub fn reader(&self) -> ScopeReader<f32> {
        self.reader.clone()
    }

    /// Sample rate the device is capturing at.
    pub fn sample_rate(&self) -> u32 {
        self.capture.sample_rate()
    }

    /// Channels delivered by the device.
    pub fn channels(&self) -> usize {
        self.reader.channels()
    }

    /// Stops the frame pump, then the device stream.
    pub async fn stop(mut self) {
        self.pump.stop_internal().await;
        tracing::info!(
            samples_written = self.reader.samples_written(),
            frames_emitted = self.pump.stats().frames_emitted,
            "scope session stopped"
        );
    }
}
