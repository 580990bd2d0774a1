//! Event system for engine monitoring.
//!
//! The engine reports coarse progress as `(EngineEvent, i64)` pairs. It
//! never formats these for humans; listeners decide how to render them.
//!
//! # Event payloads
//!
//! | Event | Payload |
//! |-------|---------|
//! | `EngineStarted` | number of items in the pool |
//! | `MiningPhaseStarted` | requested candidate pool size |
//! | `PackingPhaseStarted` | number of candidate combos handed to packing |
//! | `PoolGrown` | new candidate pool size |
//! | `SearchProgress` | proof threshold `T × L` of the finished round |
//! | `NewBestFound` | new best loadout score |
//! | `Completed` | final loadout score |
//! | `Aborted` | best loadout score reached before cancellation |
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use comboforge_solver::event::{EngineEvent, EngineEventListener, EngineEventSupport};
//!
//! #[derive(Debug)]
//! struct MyListener;
//! impl EngineEventListener for MyListener {
//!     fn on_event(&self, event: EngineEvent, value: i64) {
//!         println!("{event}: {value}");
//!     }
//! }
//!
//! let mut support = EngineEventSupport::new();
//! support.add_listener(Arc::new(MyListener));
//! support.fire(EngineEvent::EngineStarted, 512);
//! ```

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

/// Coarse engine progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEvent {
    EngineStarted,
    MiningPhaseStarted,
    PackingPhaseStarted,
    PoolGrown,
    SearchProgress,
    NewBestFound,
    Completed,
    Aborted,
}

impl EngineEvent {
    /// Every event, in declaration order.
    pub const ALL: [EngineEvent; 8] = [
        EngineEvent::EngineStarted,
        EngineEvent::MiningPhaseStarted,
        EngineEvent::PackingPhaseStarted,
        EngineEvent::PoolGrown,
        EngineEvent::SearchProgress,
        EngineEvent::NewBestFound,
        EngineEvent::Completed,
        EngineEvent::Aborted,
    ];

    /// Stable snake_case name, used as the `event` field in logs.
    pub const fn name(self) -> &'static str {
        match self {
            EngineEvent::EngineStarted => "engine_started",
            EngineEvent::MiningPhaseStarted => "mining_phase_started",
            EngineEvent::PackingPhaseStarted => "packing_phase_started",
            EngineEvent::PoolGrown => "pool_grown",
            EngineEvent::SearchProgress => "search_progress",
            EngineEvent::NewBestFound => "new_best_found",
            EngineEvent::Completed => "completed",
            EngineEvent::Aborted => "aborted",
        }
    }

    /// Returns true for events that end a run.
    pub const fn is_terminal(self) -> bool {
        matches!(self, EngineEvent::Completed | EngineEvent::Aborted)
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Listener for engine events.
///
/// Listeners may be called from worker threads.
pub trait EngineEventListener: Send + Sync + Debug {
    fn on_event(&self, event: EngineEvent, value: i64);
}

/// Central event broadcaster.
///
/// All listener methods are called synchronously in registration order.
#[derive(Clone, Default)]
pub struct EngineEventSupport {
    listeners: Vec<Arc<dyn EngineEventListener>>,
}

impl EngineEventSupport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn EngineEventListener>) {
        self.listeners.push(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Sends `(event, value)` to every listener.
    pub fn fire(&self, event: EngineEvent, value: i64) {
        for listener in &self.listeners {
            listener.on_event(event, value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl Debug for EngineEventSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineEventSupport")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A logging listener that writes events as tracing records.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventListener {
    prefix: String,
}

impl LoggingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logging listener whose records carry `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl EngineEventListener for LoggingEventListener {
    fn on_event(&self, event: EngineEvent, value: i64) {
        info!(
            event = event.name(),
            value,
            prefix = %self.prefix,
        );
    }
}

/// A counting listener that tracks event occurrences.
///
/// Useful for testing and statistics collection.
#[derive(Debug, Default)]
pub struct CountingEventListener {
    counts: [AtomicUsize; EngineEvent::ALL.len()],
}

impl CountingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `event` was received.
    pub fn count(&self, event: EngineEvent) -> usize {
        self.counts[event.slot()].load(Ordering::SeqCst)
    }

    /// Number of events received.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        for count in &self.counts {
            count.store(0, Ordering::SeqCst);
        }
    }
}

impl EngineEventListener for CountingEventListener {
    fn on_event(&self, event: EngineEvent, _value: i64) {
        self.counts[event.slot()].fetch_add(1, Ordering::SeqCst);
    }
}

/// Adapts a closure into a listener.
pub struct FnEventListener<F> {
    f: F,
}

impl<F> FnEventListener<F>
where
    F: Fn(EngineEvent, i64) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Debug for FnEventListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEventListener").finish_non_exhaustive()
    }
}

impl<F> EngineEventListener for FnEventListener<F>
where
    F: Fn(EngineEvent, i64) + Send + Sync,
{
    fn on_event(&self, event: EngineEvent, value: i64) {
        (self.f)(event, value);
    }
}

/// Forwards events over an unbounded channel.
///
/// Sends after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelEventListener {
    sender: mpsc::UnboundedSender<(EngineEvent, i64)>,
}

impl ChannelEventListener {
    pub fn new(sender: mpsc::UnboundedSender<(EngineEvent, i64)>) -> Self {
        Self { sender }
    }

    /// Creates a listener and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<(EngineEvent, i64)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl EngineEventListener for ChannelEventListener {
    fn on_event(&self, event: EngineEvent, value: i64) {
        let _ = self.sender.send((event, value));
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
