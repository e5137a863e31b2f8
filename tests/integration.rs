//! Integration tests for scopebuf.
//!
//! Note: Tests that require actual audio hardware are marked with
//! `#[ignore]` and should be run manually.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use scopebuf::{
    event_callback, BufferConfig, MockSource, RingBuffer, Scope, ScopeError, ScopeEvent,
    ScopePreset,
};

fn ramp(from: i32, to: i32) -> Vec<i32> {
    (from..=to).collect()
}

#[test]
fn test_round_trip_without_wrap() {
    let mut ring = RingBuffer::<i32>::new(1, 64);
    ring.write(&[ramp(1, 20)], 20);

    let window = ring.read(20);
    assert_eq!(window.channel(0).unwrap(), ramp(1, 20).as_slice());
    assert_eq!(window.end_position, 20);
}

#[test]
fn test_wraparound_window() {
    let mut ring = RingBuffer::<i32>::new(1, 100);
    ring.write(&[ramp(0, 79)], 80);
    ring.write(&[ramp(80, 119)], 40);

    let window = ring.read(50);
    assert_eq!(window.channel(0).unwrap(), ramp(70, 119).as_slice());
    assert_eq!(window.start_position(), 70);
}

#[test]
fn test_channels_are_independent() {
    let mut ring = RingBuffer::<f32>::new(3, 16);
    ring.write(&[vec![1.0; 6], vec![2.0; 6], vec![3.0; 6]], 6);
    ring.write(&[vec![-1.0; 4], vec![-2.0; 4], vec![-3.0; 4]], 4);

    let window = ring.read(8);
    for (channel, value) in [(0, 1.0f32), (1, 2.0), (2, 3.0)] {
        let lane = window.channel(channel).unwrap();
        assert!(lane[..4].iter().all(|&s| s == value));
        assert!(lane[4..].iter().all(|&s| s == -value));
    }
}

#[test]
fn test_initial_window_is_zeroed() {
    let ring = RingBuffer::<f64>::new(2, 32);
    let window = ring.read(31);
    assert_eq!(window.len(), 31);
    assert!(window.channels.iter().flatten().all(|&s| s == 0.0));

    let mut ring = RingBuffer::<i16>::new(1, 32);
    ring.write(&[[5i16; 3]], 3);
    assert_eq!(ring.read(5).channel(0).unwrap(), &[0, 0, 5, 5, 5]);
}

#[test]
#[should_panic(expected = "does not fit a buffer of capacity 100")]
fn test_read_of_capacity_panics() {
    let ring = RingBuffer::<f32>::new(1, 100);
    let _ = ring.read(100);
}

#[test]
fn test_try_read_into_rejects_full_capacity() {
    let ring = RingBuffer::<f32>::new(2, 100);
    let mut out = vec![vec![0.0f32; 100]; 2];

    assert_eq!(
        ring.try_read_into(&mut out, 100),
        Err(ScopeError::ReadTooLarge {
            requested: 100,
            capacity: 100
        })
    );
    assert_eq!(ring.try_read_into(&mut out, 99), Ok(0));
}

#[test]
fn test_zero_counts_are_noops() {
    let mut ring = RingBuffer::<i32>::new(1, 8);
    ring.write(&[ramp(1, 4)], 4);
    ring.write(&[ramp(100, 104)], 0);

    assert_eq!(ring.samples_written(), 4);
    assert!(ring.read(0).is_empty());
    assert_eq!(ring.read(0).end_position, 4);
    assert_eq!(ring.read(4).channel(0).unwrap(), &[1, 2, 3, 4]);
}

#[test]
fn test_worked_example() {
    // Capacity 8: write [1..=5], then [6..=9], read the last 6
    let mut ring = RingBuffer::<f32>::new(1, 8);
    ring.write(&[[1.0f32, 2.0, 3.0, 4.0, 5.0]], 5);
    ring.write(&[[6.0f32, 7.0, 8.0, 9.0]], 4);

    let window = ring.read(6);
    assert_eq!(window.channel(0).unwrap(), &[4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    assert_eq!(window.end_position, 9);
}

#[test]
fn test_oversized_write_keeps_tail() {
    let mut ring = RingBuffer::<i32>::new(1, 10);
    ring.write(&[ramp(1, 3)], 3);
    ring.write(&[ramp(4, 28)], 25);

    assert_eq!(ring.samples_written(), 28);
    assert_eq!(ring.read(9).channel(0).unwrap(), ramp(20, 28).as_slice());
}

#[test]
fn test_concurrent_readers_never_see_torn_values() {
    const TOTAL: i32 = 200_000;
    const BLOCK: usize = 64;
    const READ: usize = 128;

    let (mut writer, reader) = RingBuffer::<i32>::new(2, 1024).split();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let reader = reader.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut out = vec![vec![0i32; READ]; 2];
                let mut last_end = 0u64;
                let mut reads = 0u64;
                while !done.load(Ordering::SeqCst) {
                    let end = reader.read_into(&mut out, READ);
                    assert!(end >= last_end, "write position went backwards");
                    last_end = end;

                    for lane in &out {
                        for &value in lane {
                            assert!(
                                value == 0 || (1..=TOTAL).contains(&value),
                                "torn value {value}"
                            );
                        }
                    }
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    let mut next = 1;
    while next <= TOTAL {
        let end = (next + BLOCK as i32 - 1).min(TOTAL);
        let block = ramp(next, end);
        writer.write(&[&block, &block], block.len());
        next = end + 1;
    }
    done.store(true, Ordering::SeqCst);

    for handle in readers {
        assert!(handle.join().unwrap() > 0);
    }

    let window = reader.read(READ);
    assert_eq!(window.end_position, TOTAL as u64);
    assert_eq!(
        window.channel(0).unwrap(),
        ramp(TOTAL - READ as i32 + 1, TOTAL).as_slice()
    );
    assert_eq!(window.channel(0), window.channel(1));
}

#[test]
fn test_mock_source_feeds_reader() {
    let mut mock = MockSource::new(48000, 2);
    mock.generate_sine(1000.0, 20);

    let config = BufferConfig::default();
    let (mut writer, reader) = RingBuffer::<f32>::new(2, config.capacity()).split();
    mock.feed(&mut writer, config.block_size);

    let frame = reader.read(config.read_size);
    assert_eq!(frame.end_position, 960);
    assert!(frame.peak() > 0.9);
    assert_eq!(frame.mixdown().len(), config.read_size);
}

#[tokio::test]
async fn test_realtime_mock_through_frame_pump() {
    let (writer, reader) = RingBuffer::<f32>::new(2, 4096).split();
    let producer = MockSource::spawn_realtime(writer, 440.0, 256, 48000).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    let (pump, mut frames) = Scope::builder()
        .preset(ScopePreset::Oscilloscope)
        .frame_rate(100)
        .on_event(move |event| sink.lock().unwrap().push(event))
        .start_with_reader(reader)
        .unwrap();

    let mut last_end = 0;
    for _ in 0..5 {
        let frame = tokio::time::timeout(Duration::from_secs(2), frames.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(frame.len(), 256);
        assert_eq!(frame.channel_count(), 2);
        assert!(frame.end_position >= last_end);
        last_end = frame.end_position;
    }

    assert!(pump.stats().frames_emitted >= 5);
    pump.stop().await;
    assert!(producer.stop().is_some());

    let events = events.lock().unwrap();
    assert!(!events
        .iter()
        .any(|e| matches!(e, ScopeEvent::HeadroomExceeded { .. })));
}

#[test]
fn test_event_callback_is_shareable() {
    let callback = event_callback(|_| {});
    let shared = Arc::clone(&callback);
    thread::spawn(move || shared(ScopeEvent::WriterResumed))
        .join()
        .unwrap();
    callback(ScopeEvent::WriterResumed);
}

#[tokio::test]
#[ignore = "requires audio hardware"]
async fn test_live_scope_delivers_frames() {
    let (session, mut frames) = Scope::builder()
        .preset(ScopePreset::Spectrum)
        .start()
        .await
        .unwrap();

    let frame = frames.recv().await.unwrap();
    assert_eq!(frame.len(), 1024);
    assert!(session.is_running());
    session.stop().await;
}
