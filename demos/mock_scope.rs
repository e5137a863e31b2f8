//! Mock scope example.
//!
//! Drives a scope buffer from a synthetic sine producer, no audio hardware
//! needed, and reads it both through the frame pump and directly.
//!
//! Run with: cargo run --example mock_scope

use std::time::Duration;
use scopebuf::{BufferConfig, MockSource, RingBuffer, Scope, ScopePreset};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = BufferConfig {
        channels: 2,
        block_size: 256,
        ..Default::default()
    }
    .with_preset(ScopePreset::Spectrum);
    config.validate()?;

    let (writer, reader) = RingBuffer::<f32>::try_new(config.channels, config.capacity())?.split();
    let producer = MockSource::spawn_realtime(writer, 440.0, config.block_size, 48000)?;

    let (pump, mut frames) = Scope::builder()
        .config(config.clone())
        .frame_rate(20)
        .on_event(|e| tracing::warn!(?e, "scope event"))
        .start_with_reader(reader.clone())?;

    // A second consumer polling on its own schedule
    let meter = tokio::spawn(async move {
        let mut lane = vec![0.0f32; 128];
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let end = reader.read_channel_into(0, &mut lane);
            let peak = lane.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            println!("meter   @ {end:>8}: peak {peak:.3}");
        }
    });

    for _ in 0..20 {
        let Some(frame) = frames.recv().await else { break };
        let mono = frame.mixdown();
        let energy = mono.iter().map(|s| s * s).sum::<f32>() / mono.len() as f32;
        println!(
            "frame   @ {:>8}: {} samples, rms {:.3}",
            frame.end_position,
            frame.len(),
            energy.sqrt()
        );
    }

    meter.await?;
    let stats = pump.stats();
    pump.stop().await;
    producer.stop();

    println!("Stats: {stats:?}");
    Ok(())
}
