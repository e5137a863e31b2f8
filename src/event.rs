//! Runtime events for monitoring scope health.
//!
//! Events are non-fatal notifications. Capture and frame delivery continue
//! after any event - they're for logging and diagnostics, not error handling.

use std::sync::Arc;

/// Runtime events emitted while a scope is running.
///
/// # Example
///
/// ```
/// use scopebuf::ScopeEvent;
///
/// fn handle_event(event: ScopeEvent) {
///     match event {
///         ScopeEvent::StreamError { reason } => {
///             eprintln!("Audio stream error: {}", reason);
///         }
///         ScopeEvent::WriterStalled { idle_ms } => {
///             eprintln!("No audio for {}ms", idle_ms);
///         }
///         ScopeEvent::WriterResumed => {
///             eprintln!("Audio resumed");
///         }
///         ScopeEvent::HeadroomExceeded { largest_write, read_size, capacity } => {
///             eprintln!(
///                 "Buffer too small: {} + {} >= {}",
///                 largest_write, read_size, capacity
///             );
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeEvent {
    /// The audio backend reported an error on the capture stream.
    ///
    /// The stream may recover on its own; if it doesn't, a
    /// [`WriterStalled`](ScopeEvent::WriterStalled) event follows.
    StreamError {
        /// Description of the backend error.
        reason: String,
    },

    /// The write position has not advanced for an extended period.
    ///
    /// Frames keep being delivered, but they repeat the same window.
    WriterStalled {
        /// How long the writer has been idle.
        idle_ms: u64,
    },

    /// The writer advanced again after a
    /// [`WriterStalled`](ScopeEvent::WriterStalled) event.
    WriterResumed,

    /// A write block plus the read window no longer fits the buffer.
    ///
    /// Reads can now overlap the region being written and show torn
    /// windows. Increase `headroom_blocks` or reduce the read size.
    /// Emitted at most once per pump.
    HeadroomExceeded {
        /// Largest block the writer has delivered.
        largest_write: usize,
        /// Samples read per frame.
        read_size: usize,
        /// Buffer capacity.
        capacity: usize,
    },
}

/// Callback type for receiving runtime events.
///
/// Register one via [`ScopeBuilder::on_event()`](crate::ScopeBuilder::on_event).
/// It is invoked from the pump task and from the audio backend's error
/// callback, never from the real-time data path.
pub type EventCallback = Arc<dyn Fn(ScopeEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use scopebuf::{event_callback, ScopeEvent};
///
/// let callback = event_callback(|event| {
///     println!("Got event: {:?}", event);
/// });
/// callback(ScopeEvent::WriterResumed);
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(ScopeEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}
