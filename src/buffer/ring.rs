//! Fixed-capacity multi-channel circular store.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::buffer::{ScopeReader, ScopeWriter};
use crate::{Sample, ScopeError, Snapshot};

/// A circular buffer holding the most recent `capacity` samples of each of
/// `channels` channels.
///
/// Supports exactly one writer and any number of concurrent readers. Reads
/// never consume data: each read returns the window of samples that ends at
/// the write position observed when the read started.
///
/// # Single writer
///
/// [`write`](Self::write) takes `&mut self`, so while the buffer is owned
/// directly only one writer can exist. To share it across threads, call
/// [`split`](Self::split), which hands out exactly one [`ScopeWriter`] and a
/// cloneable [`ScopeReader`].
///
/// # Read/write overlap
///
/// The writer stores samples first and publishes the new write position
/// afterwards (`Release`/`Acquire`). A reader therefore never sees a position
/// whose samples are missing. It can, however, still be copying its window
/// while the writer laps it and overwrites the oldest part of that window.
/// Size the buffer so that `capacity` comfortably exceeds the largest write
/// block plus the largest read window; ten callback blocks is a good default.
/// When the margin is too small the reader sees a mix of older and newer
/// samples. Every individual sample is still one that was actually written,
/// and all indices stay in bounds.
///
/// # Example
///
/// ```
/// use scopebuf::RingBuffer;
///
/// let mut ring = RingBuffer::<f32>::new(1, 8);
/// ring.write(&[[1.0, 2.0, 3.0, 4.0, 5.0]], 5);
/// ring.write(&[[6.0, 7.0, 8.0, 9.0]], 4);
///
/// let window = ring.read(6);
/// assert_eq!(window.channel(0), Some(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0][..]));
/// ```
pub struct RingBuffer<T: Sample> {
    lanes: Box<[Box<[T::Slot]>]>,
    capacity: usize,
    /// Total samples written per channel. Only the writer advances it.
    cursor: AtomicU64,
    largest_write: AtomicUsize,
}

impl<T: Sample> RingBuffer<T> {
    /// Creates a zero-filled buffer with `channels` channels of `capacity`
    /// samples each.
    ///
    /// # Panics
    ///
    /// Panics if `channels` or `capacity` is zero. Use
    /// [`try_new`](Self::try_new) to handle that case.
    pub fn new(channels: usize, capacity: usize) -> Self {
        Self::try_new(channels, capacity).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Creates a zero-filled buffer, rejecting empty geometries.
    pub fn try_new(channels: usize, capacity: usize) -> Result<Self, ScopeError> {
        if channels == 0 {
            return Err(ScopeError::InvalidChannelCount { channels });
        }
        if capacity == 0 {
            return Err(ScopeError::InvalidCapacity { capacity });
        }

        let lanes = (0..channels)
            .map(|_| (0..capacity).map(|_| T::new_slot(T::default())).collect())
            .collect();

        tracing::debug!(channels, capacity, "ring buffer allocated");

        Ok(Self {
            lanes,
            capacity,
            cursor: AtomicU64::new(0),
            largest_write: AtomicUsize::new(0),
        })
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.lanes.len()
    }

    /// Samples held per channel.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total samples written per channel since construction.
    pub fn samples_written(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Largest single block written so far, in samples per channel.
    pub fn largest_write(&self) -> usize {
        self.largest_write.load(Ordering::Relaxed)
    }

    /// Writes `count` samples from each channel's source slice.
    ///
    /// `block` must hold one slice per channel, each at least `count`
    /// samples long. A block longer than the capacity leaves the buffer
    /// exactly as writing it sample by sample would: only its trailing
    /// `capacity` samples survive.
    ///
    /// # Panics
    ///
    /// Panics if `block` has the wrong number of channels or a slice is
    /// shorter than `count`.
    pub fn write<B: AsRef<[T]>>(&mut self, block: &[B], count: usize) {
        self.write_planar(block, count);
    }

    /// Writes interleaved frames (`[l0, r0, l1, r1, ..]`).
    ///
    /// A trailing partial frame is ignored.
    pub fn write_interleaved(&mut self, data: &[T]) {
        self.write_interleaved_with(data, |s| s);
    }

    /// Splits the buffer into its single writer and a cloneable reader.
    pub fn split(self) -> (ScopeWriter<T>, ScopeReader<T>) {
        let ring = Arc::new(self);
        (ScopeWriter::new(Arc::clone(&ring)), ScopeReader::new(ring))
    }

    /// Returns the most recent `count` samples of every channel.
    ///
    /// Before anything has been written the window is all zeros.
    ///
    /// # Panics
    ///
    /// Panics if `count >= capacity`.
    pub fn read(&self, count: usize) -> Snapshot<T> {
        if let Err(e) = self.check_window(count) {
            panic!("{e}");
        }
        let mut lanes = vec![vec![T::default(); count]; self.channels()];
        let end = self.read_into(&mut lanes, count);
        Snapshot::new(lanes, end)
    }

    /// Copies the most recent `count` samples of every channel into `out`,
    /// oldest first, and returns the write position the window ends at.
    ///
    /// # Panics
    ///
    /// Panics if `count >= capacity`, if `out` does not hold one buffer per
    /// channel, or if a buffer is shorter than `count`.
    pub fn read_into<B: AsMut<[T]>>(&self, out: &mut [B], count: usize) -> u64 {
        self.try_read_into(out, count)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`read_into`](Self::read_into).
    pub fn try_read_into<B: AsMut<[T]>>(
        &self,
        out: &mut [B],
        count: usize,
    ) -> Result<u64, ScopeError> {
        self.check_window(count)?;
        if out.len() != self.channels() {
            return Err(ScopeError::ChannelCountMismatch {
                expected: self.channels(),
                actual: out.len(),
            });
        }
        for (channel, dst) in out.iter_mut().enumerate() {
            let actual = dst.as_mut().len();
            if actual < count {
                return Err(ScopeError::BufferTooShort {
                    channel,
                    required: count,
                    actual,
                });
            }
        }

        // One cursor snapshot for the whole read.
        let cursor = self.cursor.load(Ordering::Acquire);
        if count == 0 {
            return Ok(cursor);
        }

        let start = self.window_start(cursor, count);
        for (lane, dst) in self.lanes.iter().zip(out.iter_mut()) {
            load_run::<T>(lane, start, &mut dst.as_mut()[..count]);
        }
        Ok(cursor)
    }

    /// Copies the most recent `out.len()` samples of a single channel.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is out of range or `out.len() >= capacity`.
    pub fn read_channel_into(&self, channel: usize, out: &mut [T]) -> u64 {
        let count = out.len();
        if let Err(e) = self.check_window(count) {
            panic!("{e}");
        }
        let Some(lane) = self.lanes.get(channel) else {
            panic!(
                "{}",
                ScopeError::ChannelOutOfRange {
                    channel,
                    channels: self.channels(),
                }
            );
        };

        let cursor = self.cursor.load(Ordering::Acquire);
        if count > 0 {
            load_run::<T>(lane, self.window_start(cursor, count), out);
        }
        cursor
    }

    pub(crate) fn write_planar<B: AsRef<[T]>>(&self, block: &[B], count: usize) {
        assert!(
            block.len() == self.channels(),
            "{}",
            ScopeError::ChannelCountMismatch {
                expected: self.channels(),
                actual: block.len(),
            }
        );
        for (channel, source) in block.iter().enumerate() {
            let actual = source.as_ref().len();
            assert!(
                actual >= count,
                "{}",
                ScopeError::BufferTooShort {
                    channel,
                    required: count,
                    actual,
                }
            );
        }
        if count == 0 {
            return;
        }

        let (skip, start) = self.placement(count);
        for (lane, source) in self.lanes.iter().zip(block) {
            store_run::<T>(lane, start, &source.as_ref()[skip..count]);
        }
        self.commit(count);
    }

    pub(crate) fn write_interleaved_with<S, F>(&self, data: &[S], convert: F)
    where
        S: Copy,
        F: Fn(S) -> T,
    {
        let channels = self.channels();
        let frames = data.len() / channels;
        if frames == 0 {
            return;
        }

        let (skip, start) = self.placement(frames);
        let body = &data[skip * channels..frames * channels];
        for (channel, lane) in self.lanes.iter().enumerate() {
            let mut index = start;
            for frame in body.chunks_exact(channels) {
                T::store(&lane[index], convert(frame[channel]));
                index += 1;
                if index == self.capacity {
                    index = 0;
                }
            }
        }
        self.commit(frames);
    }

    fn check_window(&self, count: usize) -> Result<(), ScopeError> {
        if count >= self.capacity {
            return Err(ScopeError::ReadTooLarge {
                requested: count,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Physical index of the oldest sample in a `count`-sample window ending
    /// at `cursor`.
    fn window_start(&self, cursor: u64, count: usize) -> usize {
        let end = (cursor % self.capacity as u64) as usize;
        (end + self.capacity - count) % self.capacity
    }

    /// Returns how many leading samples of a `count`-sample write are
    /// overwritten within the same write, and where the survivors start.
    fn placement(&self, count: usize) -> (usize, usize) {
        let skip = count.saturating_sub(self.capacity);
        let cursor = self.cursor.load(Ordering::Relaxed) + skip as u64;
        (skip, (cursor % self.capacity as u64) as usize)
    }

    fn commit(&self, count: usize) {
        if count > self.largest_write.load(Ordering::Relaxed) {
            self.largest_write.store(count, Ordering::Relaxed);
        }
        self.cursor.fetch_add(count as u64, Ordering::Release);
    }
}

impl<T: Sample> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("channels", &self.channels())
            .field("capacity", &self.capacity)
            .field("samples_written", &self.samples_written())
            .finish_non_exhaustive()
    }
}

/// Stores `src` into `lane` starting at `start`, wrapping to index 0.
fn store_run<T: Sample>(lane: &[T::Slot], start: usize, src: &[T]) {
    let first = src.len().min(lane.len() - start);
    let (head, tail) = src.split_at(first);
    for (slot, &value) in lane[start..start + first].iter().zip(head) {
        T::store(slot, value);
    }
    for (slot, &value) in lane.iter().zip(tail) {
        T::store(slot, value);
    }
}

/// Loads `dst.len()` samples from `lane` starting at `start`, wrapping to
/// index 0.
fn load_run<T: Sample>(lane: &[T::Slot], start: usize, dst: &mut [T]) {
    let first = dst.len().min(lane.len() - start);
    let (head, tail) = dst.split_at_mut(first);
    for (value, slot) in head.iter_mut().zip(&lane[start..start + first]) {
        *value = T::load(slot);
    }
    for (value, slot) in tail.iter_mut().zip(lane.iter()) {
        *value = T::load(slot);
    }
}
