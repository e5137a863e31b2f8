//! Live scope example.
//!
//! Captures from the default input device (or the device named on the
//! command line) and prints a level meter for every frame.
//!
//! Run with: cargo run --example live_scope -- [device name]

use std::time::Duration;
use scopebuf::{list_input_devices, Scope, ScopePreset};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scopebuf=info".into()),
        )
        .init();

    println!("Input devices:");
    for name in list_input_devices()? {
        println!("  - {name}");
    }

    let mut builder = Scope::builder()
        .preset(ScopePreset::Oscilloscope)
        .frame_rate(30)
        .on_event(|e| tracing::warn!(?e, "scope event"));
    if let Some(name) = std::env::args().nth(1) {
        builder = builder.device(name);
    }

    let (session, mut frames) = builder.start().await?;
    println!(
        "Scoping {} channel(s) at {} Hz for 5 seconds...",
        session.channels(),
        session.sample_rate()
    );

    let deadline = tokio::time::sleep(Duration::from_secs(5));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            frame = frames.recv() => {
                let Some(frame) = frame else { break };
                let peak = frame.peak();
                let bar = "#".repeat((peak * 50.0).min(50.0) as usize);
                println!("{:>10} {peak:>6.3} |{bar:<50}|", frame.end_position);
            }
        }
    }

    // Get stats before stopping (stop() consumes the session)
    let stats = session.stats();
    let written = session.samples_written();
    session.stop().await;

    println!("Samples written: {written}");
    println!("Stats: {stats:?}");

    Ok(())
}
