//! Frame delivery from a scope buffer to async consumers.
//!
//! ```text
//! Audio Thread → Scope Buffer ← Frame Pump (tokio task) → mpsc → Visualizer
//! ```
//!
//! The pump is an ordinary reader: it takes a window from the buffer once per
//! frame interval and hands it to a bounded channel. A slow consumer loses
//! frames, never audio, and never blocks the writer.

mod pump;

pub use pump::{spawn_frame_pump, FramePump, PumpHandle, PumpStats};
