//! Engine statistics.
//!
//! Timing and node counters for an engine run and its phases.

use std::time::{Duration, Instant};

/// Engine-level statistics.
///
/// Tracks aggregate metrics across every phase of one `solve` call.
///
/// # Example
///
/// ```
/// use comboforge_solver::stats::{EngineStats, PhaseStats};
///
/// let mut stats = EngineStats::default();
/// stats.start();
///
/// let mut phase = PhaseStats::new("mining", 1);
/// phase.record_nodes(120);
/// stats.record_phase(phase);
/// stats.record_round();
///
/// assert_eq!(stats.rounds, 1);
/// assert_eq!(stats.nodes_explored(), 120);
/// assert_eq!(stats.phases[0].phase_type, "mining");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    start_time: Option<Instant>,
    finished: Option<Duration>,
    /// Completed mine-and-pack rounds.
    pub rounds: u32,
    /// Size of the last candidate pool mined.
    pub pool_size: usize,
    /// Phases in execution order.
    pub phases: Vec<PhaseStats>,
}

impl EngineStats {
    /// Marks the start of the run.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.finished = None;
    }

    /// Freezes the elapsed time.
    pub fn finish(&mut self) {
        self.finished = Some(self.elapsed());
    }

    /// Elapsed time since [`start`](Self::start), frozen by
    /// [`finish`](Self::finish).
    pub fn elapsed(&self) -> Duration {
        self.finished
            .or_else(|| self.start_time.map(|t| t.elapsed()))
            .unwrap_or_default()
    }

    pub fn record_round(&mut self) {
        self.rounds += 1;
    }

    /// Appends a phase, freezing its elapsed time.
    pub fn record_phase(&mut self, mut phase: PhaseStats) {
        phase.finish();
        self.phases.push(phase);
    }

    /// Search nodes visited across all phases.
    pub fn nodes_explored(&self) -> u64 {
        self.phases.iter().map(|p| p.nodes_explored).sum()
    }

    /// Search nodes visited by phases of one type.
    pub fn nodes_for(&self, phase_type: &str) -> u64 {
        self.phases
            .iter()
            .filter(|p| p.phase_type == phase_type)
            .map(|p| p.nodes_explored)
            .sum()
    }
}

/// Phase-level statistics.
#[derive(Debug, Clone)]
pub struct PhaseStats {
    /// Phase name: `potential`, `mining` or `packing`.
    pub phase_type: &'static str,
    /// Engine round the phase ran in (0 for the potential analysis).
    pub round: u32,
    start_time: Instant,
    finished: Option<Duration>,
    /// Search nodes visited.
    pub nodes_explored: u64,
}

impl PhaseStats {
    pub fn new(phase_type: &'static str, round: u32) -> Self {
        Self {
            phase_type,
            round,
            start_time: Instant::now(),
            finished: None,
            nodes_explored: 0,
        }
    }

    pub fn record_nodes(&mut self, nodes: u64) {
        self.nodes_explored += nodes;
    }

    pub fn finish(&mut self) {
        if self.finished.is_none() {
            self.finished = Some(self.start_time.elapsed());
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.finished.unwrap_or_else(|| self.start_time.elapsed())
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Nodes per second over the phase duration.
    pub fn nodes_per_second(&self) -> u64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            (self.nodes_explored as f64 / secs) as u64
        } else {
            0
        }
    }
}
