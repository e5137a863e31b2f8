//! Owned window of samples returned by a read.

use std::sync::Arc;

use crate::Sample;

/// The most recent window of samples, per channel, as seen by one read.
///
/// Channel data is stored in an `Arc` so a snapshot can be handed to
/// several consumers (for example a waveform view and a spectrum view)
/// without copying.
///
/// # Example
///
/// ```
/// use scopebuf::Snapshot;
///
/// let snapshot = Snapshot::new(vec![vec![0.5f32, -0.25], vec![0.5, 0.75]], 1024);
/// assert_eq!(snapshot.len(), 2);
/// assert_eq!(snapshot.start_position(), 1022);
/// assert_eq!(snapshot.mixdown(), vec![1.0, 0.5]);
///
/// let shared = snapshot.clone(); // cheap, shares sample data
/// assert_eq!(shared.peak(), 0.75);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Samples per channel, oldest first.
    pub channels: Arc<Vec<Vec<T>>>,

    /// Write position (total samples written per channel) at which the
    /// window ends.
    pub end_position: u64,
}

impl<T: Sample> Snapshot<T> {
    /// Creates a snapshot from per-channel sample vectors.
    pub fn new(channels: Vec<Vec<T>>, end_position: u64) -> Self {
        Self {
            channels: Arc::new(channels),
            end_position,
        }
    }

    /// Samples per channel in this window.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Returns `true` if the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples of one channel, or `None` if out of range.
    pub fn channel(&self, index: usize) -> Option<&[T]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Write position of the oldest sample in the window.
    pub fn start_position(&self) -> u64 {
        self.end_position.saturating_sub(self.len() as u64)
    }

    /// Sums all channels into a single f32 lane.
    ///
    /// Channels are summed, not averaged, so a full-scale stereo signal
    /// peaks at 2.0.
    pub fn mixdown(&self) -> Vec<f32> {
        let mut mixed = vec![0.0f32; self.len()];
        for lane in self.channels.iter() {
            for (acc, &sample) in mixed.iter_mut().zip(lane) {
                *acc += sample.to_f32();
            }
        }
        mixed
    }

    /// Largest absolute sample value across all channels, as f32.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .map(|s| s.to_f32().abs())
            .fold(0.0, f32::max)
    }

    /// Unwraps the per-channel vectors, copying only if shared.
    pub fn into_channels(self) -> Vec<Vec<T>> {
        Arc::try_unwrap(self.channels).unwrap_or_else(|shared| (*shared).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_and_positions() {
        let snapshot = Snapshot::new(vec![vec![0.0f32; 256]; 2], 1000);
        assert_eq!(snapshot.len(), 256);
        assert_eq!(snapshot.channel_count(), 2);
        assert_eq!(snapshot.start_position(), 744);
    }

    #[test]
    fn test_start_position_before_buffer_filled() {
        let snapshot = Snapshot::new(vec![vec![0i16; 64]], 10);
        assert_eq!(snapshot.start_position(), 0);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot: Snapshot<f32> = Snapshot::new(vec![Vec::new(), Vec::new()], 5);
        assert!(snapshot.is_empty());
        assert!(snapshot.mixdown().is_empty());
        assert_eq!(snapshot.peak(), 0.0);
    }

    #[test]
    fn test_channel_out_of_range() {
        let snapshot = Snapshot::new(vec![vec![1.0f32]], 1);
        assert!(snapshot.channel(1).is_none());
    }

    #[test]
    fn test_mixdown_of_integer_samples() {
        let snapshot = Snapshot::new(vec![vec![16384i16, 0], vec![16384, -32768]], 2);
        assert_eq!(snapshot.mixdown(), vec![1.0, -1.0]);
    }

    #[test]
    fn test_peak_uses_absolute_value() {
        let snapshot = Snapshot::new(vec![vec![0.2f32, -0.9], vec![0.5, 0.1]], 2);
        assert_eq!(snapshot.peak(), 0.9);
    }

    #[test]
    fn test_into_channels_when_shared() {
        let snapshot = Snapshot::new(vec![vec![1i32, 2]], 2);
        let shared = snapshot.clone();
        assert_eq!(snapshot.into_channels(), vec![vec![1, 2]]);
        assert_eq!(shared.into_channels(), vec![vec![1, 2]]);
    }
}
