//! Thread-shareable writer and reader handles.

use std::sync::Arc;

use crate::buffer::RingBuffer;
use crate::{Sample, ScopeError, Snapshot};

/// The single producer side of a split [`RingBuffer`].
///
/// There is exactly one writer per buffer and it cannot be cloned. Move it
/// into the audio callback; every method is wait-free and allocation-free.
#[derive(Debug)]
pub struct ScopeWriter<T: Sample> {
    ring: Arc<RingBuffer<T>>,
}

impl<T: Sample> ScopeWriter<T> {
    pub(crate) fn new(ring: Arc<RingBuffer<T>>) -> Self {
        Self { ring }
    }

    /// Writes `count` samples from each channel's source slice.
    ///
    /// See [`RingBuffer::write`].
    pub fn write<B: AsRef<[T]>>(&mut self, block: &[B], count: usize) {
        self.ring.write_planar(block, count);
    }

    /// Writes interleaved frames, one sample per channel per frame.
    pub fn write_interleaved(&mut self, data: &[T]) {
        self.ring.write_interleaved_with(data, |s| s);
    }

    /// Writes interleaved frames, converting each sample on the way in.
    ///
    /// ```
    /// use scopebuf::{RingBuffer, Sample};
    ///
    /// let (mut writer, reader) = RingBuffer::<f32>::new(1, 8).split();
    /// writer.write_interleaved_with(&[i16::MIN, 0], i16::to_f32);
    /// assert_eq!(reader.read(2).channel(0), Some(&[-1.0, 0.0][..]));
    /// ```
    pub fn write_interleaved_with<S, F>(&mut self, data: &[S], convert: F)
    where
        S: Copy,
        F: Fn(S) -> T,
    {
        self.ring.write_interleaved_with(data, convert);
    }

    /// Creates another reader of this buffer.
    pub fn reader(&self) -> ScopeReader<T> {
        ScopeReader::new(Arc::clone(&self.ring))
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.ring.channels()
    }

    /// Samples held per channel.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Total samples written per channel.
    pub fn samples_written(&self) -> u64 {
        self.ring.samples_written()
    }
}

/// A consumer of a split [`RingBuffer`].
///
/// Readers are cheap to clone and never interfere with each other or with
/// the writer.
#[derive(Debug, Clone)]
pub struct ScopeReader<T: Sample> {
    ring: Arc<RingBuffer<T>>,
}

impl<T: Sample> ScopeReader<T> {
    pub(crate) fn new(ring: Arc<RingBuffer<T>>) -> Self {
        Self { ring }
    }

    /// Returns the most recent `count` samples of every channel.
    ///
    /// See [`RingBuffer::read`].
    pub fn read(&self, count: usize) -> Snapshot<T> {
        self.ring.read(count)
    }

    /// Copies the most recent `count` samples of every channel into `out`.
    ///
    /// See [`RingBuffer::read_into`].
    pub fn read_into<B: AsMut<[T]>>(&self, out: &mut [B], count: usize) -> u64 {
        self.ring.read_into(out, count)
    }

    /// Fallible form of [`read_into`](Self::read_into).
    pub fn try_read_into<B: AsMut<[T]>>(
        &self,
        out: &mut [B],
        count: usize,
    ) -> Result<u64, ScopeError> {
        self.ring.try_read_into(out, count)
    }

    /// Copies the most recent `out.len()` samples of one channel.
    pub fn read_channel_into(&self, channel: usize, out: &mut [T]) -> u64 {
        self.ring.read_channel_into(channel, out)
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.ring.channels()
    }

    /// Samples held per channel.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Total samples written per channel.
    pub fn samples_written(&self) -> u64 {
        self.ring.samples_written()
    }

    /// Largest block the writer has delivered so far.
    pub fn largest_write(&self) -> usize {
        self.ring.largest_write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_split_shares_storage() {
        let (mut writer, reader) = RingBuffer::<f32>::new(2, 16).split();
        writer.write(&[[0.1f32, 0.2], [0.3, 0.4]], 2);

        let window = reader.read(2);
        assert_eq!(window.channel(0).unwrap(), &[0.1, 0.2]);
        assert_eq!(window.channel(1).unwrap(), &[0.3, 0.4]);
        assert_eq!(reader.samples_written(), 2);
        assert_eq!(writer.samples_written(), 2);
    }

    #[test]
    fn test_reader_clones_see_same_data() {
        let (mut writer, reader) = RingBuffer::<i32>::new(1, 8).split();
        let other = reader.clone();
        let third = writer.reader();
        writer.write(&[[7, 8, 9]], 3);

        assert_eq!(reader.read(3), other.read(3));
        assert_eq!(reader.read(3), third.read(3));
    }

    #[test]
    fn test_writer_moves_to_another_thread() {
        let (mut writer, reader) = RingBuffer::<f32>::new(1, 64).split();

        let handle = thread::spawn(move || {
            for block in 0..4 {
                let samples = [block as f32; 8];
                writer.write(&[samples], 8);
            }
        });
        handle.join().unwrap();

        assert_eq!(reader.samples_written(), 32);
        assert_eq!(reader.largest_write(), 8);
        let window = reader.read(9);
        assert_eq!(window.channel(0).unwrap()[0], 2.0);
        assert!(window.channel(0).unwrap()[1..].iter().all(|&s| s == 3.0));
    }

    #[test]
    fn test_handles_report_geometry() {
        let (writer, reader) = RingBuffer::<i16>::new(3, 128).split();
        assert_eq!(writer.channels(), 3);
        assert_eq!(reader.channels(), 3);
        assert_eq!(writer.capacity(), 128);
        assert_eq!(reader.capacity(), 128);
    }
}
