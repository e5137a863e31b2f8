//! The multi-channel scope buffer.
//!
//! ```text
//! Audio Callback ──write──▶ RingBuffer ◀──read── Render / Analysis threads
//!   (1 writer)                             (any number of readers)
//! ```
//!
//! - **RingBuffer**: fixed-capacity per-channel storage plus one atomic
//!   write cursor
//! - **ScopeWriter**: the unique producer handle, moved into the callback
//! - **ScopeReader**: cloneable consumer handle
//!
//! Neither side blocks or takes a lock.

mod handles;
mod ring;

pub use handles::{ScopeReader, ScopeWriter};
pub use ring::RingBuffer;
