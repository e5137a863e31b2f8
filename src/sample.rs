//! Sample types that can be stored in a [`RingBuffer`](crate::RingBuffer).
//!
//! Every sample lives in its own lock-free atomic slot. A reader racing the
//! writer therefore observes either the previous or the new value of a slot,
//! never a mix of the two. Slots are accessed with `Relaxed` ordering, which
//! compiles to plain loads and stores on mainstream targets; publication is
//! handled by the ring's write cursor.

use std::sync::atomic::{AtomicI16, AtomicI32, AtomicU32, AtomicU64, Ordering};

use crate::format::{f32_to_i16, f32_to_i32, i16_to_f32, i32_to_f32};

/// A PCM sample type storable in a [`RingBuffer`](crate::RingBuffer).
pub trait Sample: Copy + Default + Send + Sync + 'static {
    /// Atomic cell holding one sample.
    type Slot: Send + Sync;

    /// Creates a slot holding `value`.
    fn new_slot(value: Self) -> Self::Slot;

    /// Loads the current value of a slot.
    fn load(slot: &Self::Slot) -> Self;

    /// Stores a value into a slot.
    fn store(slot: &Self::Slot, value: Self);

    /// Converts to a normalized f32 in [-1.0, 1.0] for float formats.
    fn to_f32(self) -> f32;

    /// Converts from a normalized f32.
    fn from_f32(value: f32) -> Self;
}

impl Sample for f32 {
    type Slot = AtomicU32;

    #[inline]
    fn new_slot(value: Self) -> Self::Slot {
        AtomicU32::new(value.to_bits())
    }

    #[inline]
    fn load(slot: &Self::Slot) -> Self {
        f32::from_bits(slot.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(slot: &Self::Slot, value: Self) {
        slot.store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl Sample for f64 {
    type Slot = AtomicU64;

    #[inline]
    fn new_slot(value: Self) -> Self::Slot {
        AtomicU64::new(value.to_bits())
    }

    #[inline]
    fn load(slot: &Self::Slot) -> Self {
        f64::from_bits(slot.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(slot: &Self::Slot, value: Self) {
        slot.store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        f64::from(value)
    }
}

impl Sample for i16 {
    type Slot = AtomicI16;

    #[inline]
    fn new_slot(value: Self) -> Self::Slot {
        AtomicI16::new(value)
    }

    #[inline]
    fn load(slot: &Self::Slot) -> Self {
        slot.load(Ordering::Relaxed)
    }

    #[inline]
    fn store(slot: &Self::Slot, value: Self) {
        slot.store(value, Ordering::Relaxed);
    }

    #[inline]
    fn to_f32(self) -> f32 {
        i16_to_f32(self)
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        f32_to_i16(value)
    }
}

impl Sample for i32 {
    type Slot = AtomicI32;

    #[inline]
    fn new_slot(value: Self) -> Self::Slot {
        AtomicI32::new(value)
    }

    #[inline]
    fn load(slot: &Self::Slot) -> Self {
        slot.load(Ordering::Relaxed)
    }

    #[inline]
    fn store(slot: &Self::Slot, value: Self) {
        slot.store(value, Ordering::Relaxed);
    }

    #[inline]
    fn to_f32(self) -> f32 {
        i32_to_f32(self)
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        f32_to_i32(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_roundtrip<T: Sample + PartialEq + std::fmt::Debug>(value: T) {
        let slot = T::new_slot(T::default());
        T::store(&slot, value);
        assert_eq!(T::load(&slot), value);
    }

    #[test]
    fn test_float_slots_are_bit_exact() {
        slot_roundtrip(-0.0f32);
        slot_roundtrip(f32::MIN_POSITIVE);
        slot_roundtrip(1.0e300f64);

        let slot = f32::new_slot(0.0);
        f32::store(&slot, f32::NAN);
        assert!(f32::load(&slot).is_nan());
    }

    #[test]
    fn test_integer_slots() {
        slot_roundtrip(i16::MIN);
        slot_roundtrip(i32::MAX);
    }

    #[test]
    fn test_default_slot_is_silence() {
        assert_eq!(f32::load(&f32::new_slot(f32::default())), 0.0);
        assert_eq!(i16::load(&i16::new_slot(i16::default())), 0);
    }

    #[test]
    fn test_normalized_conversion() {
        assert_eq!(i16::from_f32(1.0), 32767);
        assert!((i16::MIN.to_f32() + 1.0).abs() < 1e-6);
        assert_eq!(f64::from_f32(0.5), 0.5);
    }
}
