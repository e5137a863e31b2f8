//! Sample format conversion.

/// Converts f32 samples to i16.
///
/// Input should be in the range [-1.0, 1.0].
/// Values outside this range are clamped.
///
/// Uses × 32767 (not 32768) for symmetric scaling, so -1.0 maps to -32767.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

/// Converts i16 samples to f32.
///
/// Output will be in the range [-1.0, 1.0].
#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

/// Converts f32 samples to i32 with the same symmetric scaling as
/// [`f32_to_i16`].
#[inline]
pub fn f32_to_i32(sample: f32) -> i32 {
    (f64::from(sample) * f64::from(i32::MAX)).clamp(f64::from(i32::MIN), f64::from(i32::MAX))
        as i32
}

/// Converts i32 samples to f32 in the range [-1.0, 1.0].
#[inline]
pub fn i32_to_f32(sample: i32) -> f32 {
    (f64::from(sample) / 2_147_483_648.0) as f32
}

/// Converts unsigned 16-bit samples (midpoint 32768) to f32.
#[inline]
pub fn u16_to_f32(sample: u16) -> f32 {
    (f32::from(sample) - 32768.0) / 32768.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_to_i16_full_range() {
        assert_eq!(f32_to_i16(1.0), 32767);
        assert_eq!(f32_to_i16(-1.0), -32767);
        assert_eq!(f32_to_i16(0.0), 0);
    }

    #[test]
    fn test_f32_to_i16_clamping() {
        assert_eq!(f32_to_i16(2.0), 32767);
        assert_eq!(f32_to_i16(-2.0), -32768);
    }

    #[test]
    fn test_i16_to_f32_full_range() {
        let max = i16_to_f32(32767);
        assert!((max - 0.99997).abs() < 0.001);

        let min = i16_to_f32(-32768);
        assert!((min - (-1.0)).abs() < 0.001);

        assert_eq!(i16_to_f32(0), 0.0);
    }

    #[test]
    fn test_i16_roundtrip() {
        for &original in &[0i16, 1000, -1000, 32767, -32768] {
            let back = f32_to_i16(i16_to_f32(original));
            assert!((original - back).abs() <= 1);
        }
    }

    #[test]
    fn test_i32_extremes() {
        assert_eq!(f32_to_i32(0.0), 0);
        assert_eq!(f32_to_i32(4.0), i32::MAX);
        assert_eq!(f32_to_i32(-4.0), i32::MIN);
        assert!((i32_to_f32(i32::MIN) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_u16_midpoint_is_silence() {
        assert_eq!(u16_to_f32(32768), 0.0);
        assert!((u16_to_f32(0) + 1.0).abs() < 1e-6);
        assert!(u16_to_f32(u16::MAX) > 0.99);
    }
}
