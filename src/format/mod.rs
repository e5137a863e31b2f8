//! Audio format conversion utilities.
//!
//! Device callbacks deliver whatever sample format the hardware prefers;
//! these helpers map those formats onto the sample type stored in the ring.

mod convert;

pub use convert::{f32_to_i16, f32_to_i32, i16_to_f32, i32_to_f32, u16_to_f32};
