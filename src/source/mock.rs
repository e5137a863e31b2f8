//! Mock audio source for driving a scope buffer without hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::buffer::ScopeWriter;
use crate::ScopeError;

/// A mock audio source that generates synthetic planar audio.
///
/// This allows exercising writers and readers without actual audio hardware,
/// making it suitable for CI environments and demos.
///
/// # Example
///
/// ```
/// use scopebuf::{MockSource, RingBuffer};
///
/// let mut mock = MockSource::new(48000, 2);
/// mock.generate_silence(10);
/// mock.generate_sine(440.0, 10);
///
/// let (mut writer, reader) = RingBuffer::<f32>::new(2, 4096).split();
/// let blocks = mock.feed(&mut writer, 256);
///
/// assert_eq!(blocks, 4); // 960 frames in blocks of 256
/// assert_eq!(reader.samples_written(), 960);
/// ```
#[derive(Debug, Clone)]
pub struct MockSource {
    sample_rate: u32,
    lanes: Vec<Vec<f32>>,
    /// Frames generated so far, so successive sine calls stay phase-continuous.
    frames_generated: u64,
    noise_seed: u32,
}

impl MockSource {
    /// Creates a new mock source with the given format.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is zero.
    pub fn new(sample_rate: u32, channels: usize) -> Self {
        assert!(channels > 0, "mock source needs at least one channel");
        Self {
            sample_rate,
            lanes: vec![Vec::new(); channels],
            frames_generated: 0,
            noise_seed: 12345,
        }
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the channel count.
    pub fn channels(&self) -> usize {
        self.lanes.len()
    }

    /// Generates silence for the given duration in milliseconds.
    pub fn generate_silence(&mut self, duration_ms: u64) {
        let frames = self.frames_for_duration(duration_ms);
        for lane in &mut self.lanes {
            lane.resize(lane.len() + frames, 0.0);
        }
        self.frames_generated += frames as u64;
    }

    /// Generates a full-scale sine wave on every channel.
    pub fn generate_sine(&mut self, frequency: f64, duration_ms: u64) {
        let frames = self.frames_for_duration(duration_ms);
        let sample_rate = f64::from(self.sample_rate);

        for i in 0..frames as u64 {
            let t = (self.frames_generated + i) as f64 / sample_rate;
            let value = (2.0 * std::f64::consts::PI * frequency * t).sin() as f32;
            for lane in &mut self.lanes {
                lane.push(value);
            }
        }
        self.frames_generated += frames as u64;
    }

    /// Generates white noise with the given peak amplitude.
    pub fn generate_noise(&mut self, duration_ms: u64, amplitude: f32) {
        let frames = self.frames_for_duration(duration_ms);

        // Simple LCG for deterministic "random" noise
        for _ in 0..frames {
            for lane in &mut self.lanes {
                self.noise_seed = self
                    .noise_seed
                    .wrapping_mul(1_103_515_245)
                    .wrapping_add(12345);
                let random = ((self.noise_seed >> 16) as f32 / 32767.5) - 1.0;
                lane.push(random * amplitude);
            }
        }
        self.frames_generated += frames as u64;
    }

    /// Appends `frames` frames whose value on every channel is the running
    /// frame counter (1.0, 2.0, ...), useful for checking ordering.
    pub fn generate_ramp(&mut self, frames: usize) {
        for i in 0..frames as u64 {
            let value = (self.frames_generated + i + 1) as f32;
            for lane in &mut self.lanes {
                lane.push(value);
            }
        }
        self.frames_generated += frames as u64;
    }

    /// Appends interleaved frames. A trailing partial frame is ignored.
    pub fn add_interleaved(&mut self, samples: &[f32]) {
        let channels = self.channels();
        for frame in samples.chunks_exact(channels) {
            for (lane, &sample) in self.lanes.iter_mut().zip(frame) {
                lane.push(sample);
            }
        }
        self.frames_generated += (samples.len() / channels) as u64;
    }

    /// Takes all accumulated samples, clearing the internal buffers.
    pub fn take_samples(&mut self) -> Vec<Vec<f32>> {
        let channels = self.channels();
        std::mem::replace(&mut self.lanes, vec![Vec::new(); channels])
    }

    /// Returns the accumulated samples of one channel.
    pub fn samples(&self, channel: usize) -> Option<&[f32]> {
        self.lanes.get(channel).map(Vec::as_slice)
    }

    /// Number of accumulated frames.
    pub fn frames(&self) -> usize {
        self.lanes[0].len()
    }

    /// Returns the duration of accumulated samples.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    /// Writes the accumulated samples into `writer` in blocks of
    /// `block_size` frames, as an audio callback would, and clears them.
    ///
    /// Returns the number of blocks written; the last may be short.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero or the writer's channel count differs.
    pub fn feed(&mut self, writer: &mut ScopeWriter<f32>, block_size: usize) -> usize {
        assert!(block_size > 0, "block size must be greater than zero");

        let lanes = self.take_samples();
        let frames = lanes[0].len();
        let mut blocks = 0;
        let mut offset = 0;
        while offset < frames {
            let count = block_size.min(frames - offset);
            let block: Vec<&[f32]> = lanes
                .iter()
                .map(|lane| &lane[offset..offset + count])
                .collect();
            writer.write(&block, count);
            offset += count;
            blocks += 1;
        }
        blocks
    }

    /// Spawns a thread that writes a continuous sine wave into `writer` in
    /// blocks of `block_size` frames, paced at real time.
    ///
    /// Returns a handle that stops the thread and gives the writer back.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `block_size` or `sample_rate` is zero.
    pub fn spawn_realtime(
        writer: ScopeWriter<f32>,
        frequency: f64,
        block_size: usize,
        sample_rate: u32,
    ) -> Result<MockProducer, ScopeError> {
        if block_size == 0 {
            return Err(ScopeError::invalid_config(
                "block_size must be greater than zero",
            ));
        }
        if sample_rate == 0 {
            return Err(ScopeError::invalid_config(
                "sample_rate must be greater than zero",
            ));
        }

        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let handle = thread::spawn(move || {
            run_realtime(writer, frequency, block_size, sample_rate, &thread_running)
        });

        Ok(MockProducer {
            running,
            handle: Some(handle),
        })
    }

    fn frames_for_duration(&self, duration_ms: u64) -> usize {
        (u64::from(self.sample_rate) * duration_ms / 1000) as usize
    }
}

/// Producer loop: one block per block period until told to stop.
fn run_realtime(
    mut writer: ScopeWriter<f32>,
    frequency: f64,
    block_size: usize,
    sample_rate: u32,
    running: &AtomicBool,
) -> ScopeWriter<f32> {
    let channels = writer.channels();
    let period = Duration::from_secs_f64(block_size as f64 / f64::from(sample_rate));
    let step = 2.0 * std::f64::consts::PI * frequency / f64::from(sample_rate);

    let mut block = vec![0.0f32; block_size * channels];
    let mut phase = 0.0f64;
    let mut deadline = Instant::now();

    while running.load(Ordering::SeqCst) {
        for frame in block.chunks_exact_mut(channels) {
            frame.fill(phase.sin() as f32);
            phase = (phase + step) % std::f64::consts::TAU;
        }
        writer.write_interleaved(&block);

        deadline += period;
        if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
    }

    tracing::debug!(
        samples_written = writer.samples_written(),
        "mock producer stopped"
    );
    writer
}

/// Handle to a thread spawned by [`MockSource::spawn_realtime`].
///
/// Dropping the handle stops the thread without waiting for it.
pub struct MockProducer {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<ScopeWriter<f32>>>,
}

impl MockProducer {
    /// Returns `true` while the producer thread is writing.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops the producer and returns its writer.
    ///
    /// Returns `None` if the producer thread panicked.
    pub fn stop(mut self) -> Option<ScopeWriter<f32>> {
        self.running.store(false, Ordering::SeqCst);
        self.handle.take().and_then(|handle| handle.join().ok())
    }
}

impl Drop for MockProducer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RingBuffer;

    #[test]
    fn test_mock_source_silence() {
        let mut mock = MockSource::new(16000, 1);
        mock.generate_silence(100);

        let samples = mock.take_samples();
        assert_eq!(samples[0].len(), 1600); // 16000 * 0.1 = 1600
        assert!(samples[0].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_mock_source_sine() {
        let mut mock = MockSource::new(16000, 2);
        mock.generate_sine(440.0, 100);

        assert_eq!(mock.frames(), 1600);
        let left = mock.samples(0).unwrap();
        assert!(left.iter().any(|&s| s > 0.5));
        assert!(left.iter().any(|&s| s < -0.5));
        assert_eq!(mock.samples(0), mock.samples(1));
    }

    #[test]
    fn test_mock_source_noise_is_bounded_and_deterministic() {
        let mut a = MockSource::new(8000, 1);
        let mut b = MockSource::new(8000, 1);
        a.generate_noise(50, 0.5);
        b.generate_noise(50, 0.5);

        assert_eq!(a.samples(0), b.samples(0));
        assert!(a.samples(0).unwrap().iter().all(|s| s.abs() <= 0.5));
    }

    #[test]
    fn test_mock_source_ramp_continues() {
        let mut mock = MockSource::new(1000, 1);
        mock.generate_ramp(3);
        mock.generate_ramp(2);
        assert_eq!(mock.samples(0).unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_mock_source_duration() {
        let mut mock = MockSource::new(16000, 1);
        mock.generate_silence(500);
        assert_eq!(mock.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_add_interleaved() {
        let mut mock = MockSource::new(48000, 2);
        mock.add_interleaved(&[1.0, -1.0, 2.0, -2.0, 3.0]);
        assert_eq!(mock.samples(0).unwrap(), &[1.0, 2.0]);
        assert_eq!(mock.samples(1).unwrap(), &[-1.0, -2.0]);
    }

    #[test]
    fn test_feed_writes_in_blocks() {
        let mut mock = MockSource::new(1000, 1);
        mock.generate_ramp(10);

        let (mut writer, reader) = RingBuffer::<f32>::new(1, 8).split();
        assert_eq!(mock.feed(&mut writer, 4), 3);

        assert_eq!(reader.largest_write(), 4);
        assert_eq!(reader.samples_written(), 10);
        assert_eq!(
            reader.read(5).channel(0).unwrap(),
            &[6.0, 7.0, 8.0, 9.0, 10.0]
        );
        assert_eq!(mock.frames(), 0);
    }

    #[test]
    fn test_realtime_producer_advances_and_stops() {
        let (writer, reader) = RingBuffer::<f32>::new(2, 4096).split();
        let producer = MockSource::spawn_realtime(writer, 440.0, 64, 48000).unwrap();

        thread::sleep(Duration::from_millis(50));
        assert!(producer.is_running());
        let writer = producer.stop().unwrap();

        let written = reader.samples_written();
        assert!(written > 0);
        assert_eq!(written % 64, 0);
        assert_eq!(writer.samples_written(), written);

        let window = reader.read(64);
        assert_eq!(window.channel(0), window.channel(1));
    }

    #[test]
    fn test_realtime_producer_rejects_zero_rates() {
        let (writer, reader) = RingBuffer::<f32>::new(1, 1024).split();
        let result = MockSource::spawn_realtime(writer, 440.0, 64, 0);
        assert!(matches!(result, Err(ScopeError::InvalidConfig { .. })));

        let writer = RingBuffer::<f32>::new(1, 1024).split().0;
        let result = MockSource::spawn_realtime(writer, 440.0, 0, 48000);
        assert!(matches!(result, Err(ScopeError::InvalidConfig { .. })));

        assert_eq!(reader.samples_written(), 0);
    }
}
