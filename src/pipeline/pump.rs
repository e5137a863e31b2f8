//! Frame pump task - reads the scope buffer once per frame and forwards
//! snapshots to a consumer.
//!
//! The pump plays the part of a render loop for consumers that prefer to
//! receive frames over a channel:
//! - Reading the most recent window at a fixed cadence
//! - Delivering snapshots without ever waiting on a slow consumer
//! - Monitoring the writer for stalls and an under-sized buffer

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::buffer::ScopeReader;
use crate::event::EventCallback;
use crate::{PumpConfig, Sample, ScopeError, ScopeEvent, Snapshot};

/// Threshold for detecting a stalled writer.
/// If the write position doesn't move for this long, emit `WriterStalled`.
const STALL_THRESHOLD: Duration = Duration::from_millis(500);

/// Log pump progress every this many delivered frames (~10 s at 60 fps).
const PROGRESS_LOG_INTERVAL: u64 = 600;

/// Detects when the writer stops advancing and when it resumes.
struct StallMonitor {
    last_position: u64,
    last_advance: Instant,
    stalled: bool,
}

impl StallMonitor {
    fn new(position: u64, now: Instant) -> Self {
        Self {
            last_position: position,
            last_advance: now,
            stalled: false,
        }
    }

    /// Updates state from the latest write position.
    /// Returns an event to emit if the state changed.
    fn update(&mut self, position: u64, now: Instant) -> Option<ScopeEvent> {
        if position != self.last_position {
            self.last_position = position;
            self.last_advance = now;
            if self.stalled {
                self.stalled = false;
                return Some(ScopeEvent::WriterResumed);
            }
            return None;
        }

        let idle = now.saturating_duration_since(self.last_advance);
        if !self.stalled && idle > STALL_THRESHOLD {
            self.stalled = true;
            return Some(ScopeEvent::WriterStalled {
                idle_ms: idle.as_millis() as u64,
            });
        }
        None
    }
}

/// Reports, once, when write blocks grow too large for the read window.
struct HeadroomMonitor {
    read_size: usize,
    capacity: usize,
    reported: bool,
}

impl HeadroomMonitor {
    fn new(read_size: usize, capacity: usize) -> Self {
        Self {
            read_size,
            capacity,
            reported: false,
        }
    }

    fn check(&mut self, largest_write: usize) -> Option<ScopeEvent> {
        if self.reported || largest_write + self.read_size < self.capacity {
            return None;
        }
        self.reported = true;
        Some(ScopeEvent::HeadroomExceeded {
            largest_write,
            read_size: self.read_size,
            capacity: self.capacity,
        })
    }
}

/// Statistics about a running pump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Frames handed to the consumer.
    pub frames_emitted: u64,
    /// Frames discarded because the consumer had not collected earlier ones.
    pub frames_dropped: u64,
    /// Number of times the writer was detected as stalled.
    pub stalls: u64,
}

/// State shared between a pump task and its handle.
pub(crate) struct PumpState {
    pub running: AtomicBool,
    pub frames_emitted: AtomicU64,
    pub frames_dropped: AtomicU64,
    pub stalls: AtomicU64,
}

impl PumpState {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            frames_emitted: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            stalls: AtomicU64::new(0),
        }
    }

    fn stats(&self) -> PumpStats {
        PumpStats {
            frames_emitted: self.frames_emitted.load(Ordering::SeqCst),
            frames_dropped: self.frames_dropped.load(Ordering::SeqCst),
            stalls: self.stalls.load(Ordering::SeqCst),
        }
    }
}

/// Reads a scope buffer at a fixed cadence and forwards each window.
///
/// Frames are delivered with `try_send`: when the consumer falls behind,
/// new frames are dropped and counted instead of queueing stale ones. The
/// pump stops when its handle is stopped or the receiver is dropped.
pub struct FramePump<T: Sample> {
    reader: ScopeReader<T>,
    frame_tx: mpsc::Sender<Snapshot<T>>,
    state: Arc<PumpState>,
    read_size: usize,
    frame_interval: Duration,
    stall_monitor: StallMonitor,
    headroom_monitor: HeadroomMonitor,
    event_callback: Option<EventCallback>,
}

impl<T: Sample> FramePump<T> {
    /// Creates a pump reading `config.read_size` samples per frame.
    ///
    /// # Errors
    ///
    /// Returns `ReadTooLarge` if the read window doesn't fit the buffer and
    /// `InvalidConfig` for a zero frame interval.
    pub fn new(
        reader: ScopeReader<T>,
        config: &PumpConfig,
        frame_tx: mpsc::Sender<Snapshot<T>>,
    ) -> Result<Self, ScopeError> {
        if config.read_size >= reader.capacity() {
            return Err(ScopeError::ReadTooLarge {
                requested: config.read_size,
                capacity: reader.capacity(),
            });
        }
        if config.frame_interval.is_zero() {
            return Err(ScopeError::invalid_config(
                "frame_interval must be greater than zero",
            ));
        }

        let stall_monitor = StallMonitor::new(reader.samples_written(), Instant::now());
        let headroom_monitor = HeadroomMonitor::new(config.read_size, reader.capacity());

        Ok(Self {
            reader,
            frame_tx,
            state: Arc::new(PumpState::new()),
            read_size: config.read_size,
            frame_interval: config.frame_interval,
            stall_monitor,
            headroom_monitor,
            event_callback: None,
        })
    }

    /// Sets the callback that receives stall and headroom events.
    #[must_use]
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    /// Spawns the pump on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(self) -> PumpHandle {
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(self.run());
        PumpHandle::new(state, handle)
    }

    /// Runs the pump until stopped or the receiver is dropped.
    pub async fn run(mut self) {
        tracing::debug!(
            read_size = self.read_size,
            capacity = self.reader.capacity(),
            interval = ?self.frame_interval,
            "frame pump starting"
        );

        let mut interval = tokio::time::interval(self.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.state.running.load(Ordering::SeqCst) {
            interval.tick().await;
            if !self.state.running.load(Ordering::SeqCst) {
                break;
            }

            let snapshot = self.next_frame(Instant::now());
            if !self.deliver(snapshot) {
                tracing::debug!("frame receiver dropped, stopping pump");
                break;
            }
        }

        self.state.running.store(false, Ordering::SeqCst);
        tracing::debug!(stats = ?self.state.stats(), "frame pump stopped");
    }

    /// Reads the next window and runs the monitors over it.
    fn next_frame(&mut self, now: Instant) -> Snapshot<T> {
        let snapshot = self.reader.read(self.read_size);

        if let Some(event) = self.stall_monitor.update(snapshot.end_position, now) {
            match &event {
                ScopeEvent::WriterStalled { idle_ms } => {
                    self.state.stalls.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!(idle_ms, "scope writer stalled");
                }
                _ => tracing::info!("scope writer resumed"),
            }
            self.emit_event(event);
        }

        if let Some(event) = self.headroom_monitor.check(self.reader.largest_write()) {
            tracing::warn!(
                ?event,
                "write block plus read window exceeds buffer capacity - frames may tear"
            );
            self.emit_event(event);
        }

        snapshot
    }

    /// Hands a frame to the consumer. Returns `false` once the receiver is gone.
    fn deliver(&self, snapshot: Snapshot<T>) -> bool {
        match self.frame_tx.try_send(snapshot) {
            Ok(()) => {
                let frames = self.state.frames_emitted.fetch_add(1, Ordering::SeqCst) + 1;
                if frames % PROGRESS_LOG_INTERVAL == 0 {
                    tracing::debug!(
                        frames,
                        dropped = self.state.frames_dropped.load(Ordering::SeqCst),
                        position = self.reader.samples_written(),
                        "frame pump progress"
                    );
                }
                true
            }
            Err(TrySendError::Full(_)) => {
                self.state.frames_dropped.fetch_add(1, Ordering::SeqCst);
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    fn emit_event(&self, event: ScopeEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }
}

/// Handle to a running [`FramePump`].
///
/// Dropping the handle stops the pump after its current frame; prefer
/// [`stop()`](PumpHandle::stop) to wait for it.
pub struct PumpHandle {
    state: Arc<PumpState>,
    handle: Option<JoinHandle<()>>,
}

impl PumpHandle {
    pub(crate) fn new(state: Arc<PumpState>, handle: JoinHandle<()>) -> Self {
        Self {
            state,
            handle: Some(handle),
        }
    }

    /// Returns `true` while the pump is delivering frames.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Returns current pump statistics.
    pub fn stats(&self) -> PumpStats {
        self.state.stats()
    }

    /// Stops the pump and waits for its task to finish.
    pub async fn stop(mut self) {
        self.stop_internal().await;
    }

    pub(crate) async fn stop_internal(&mut self) {
        self.state.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for PumpHandle {
    fn drop(&mut self) {
        self.state.running.store(false, Ordering::SeqCst);
    }
}

/// Creates a frame channel and spawns a pump feeding it.
///
/// # Errors
///
/// Returns an error if the pump configuration doesn't fit the buffer or
/// `frame_capacity` is zero.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_frame_pump<T: Sample>(
    reader: ScopeReader<T>,
    config: &PumpConfig,
    event_callback: Option<EventCallback>,
) -> Result<(PumpHandle, mpsc::Receiver<Snapshot<T>>), ScopeError> {
    if config.frame_capacity == 0 {
        return Err(ScopeError::invalid_config(
            "frame_capacity must be greater than zero",
        ));
    }

    let (frame_tx, frame_rx) = mpsc::channel(config.frame_capacity);
    let mut pump = FramePump::new(reader, config, frame_tx)?;
    if let Some(callback) = event_callback {
        pump = pump.with_event_callback(callback);
    }
    Ok((pump.spawn(), frame_rx))
}
