//! Colorful console output for engine runs.
//!
//! Provides a custom `tracing` layer that renders the engine's structured
//! events (`event = "engine_start"`, `"mining_phase"`, ...) with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Engine start/end and per-round phase summaries
//! - **DEBUG**: Pool growth
//! - **WARN**: Pool cap reached before the proof

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static RUN_START_NANOS: AtomicU64 = AtomicU64::new(0);

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and installs the global tracing subscriber.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let default_directive = "comboforge_solver=info"
            .parse::<Directive>()
            .unwrap_or_else(|_| LevelFilter::INFO.into());
        let filter = EnvFilter::builder()
            .with_default_directive(default_directive)
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(EngineConsoleLayer)
            .try_init();
    });
}

fn mark_run_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    RUN_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = RUN_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
  ____                _           _____
 / ___|___  _ __ ___ | |__   ___ |  ___|__  _ __ __ _  ___
| |   / _ \| '_ ` _ \| '_ \ / _ \| |_ / _ \| '__/ _` |/ _ \
| |__| (_) | | | | | | |_) | (_) |  _| (_) | | | (_| |  __/
 \____\___/|_| |_| |_|_.__/ \___/|_|  \___/|_|  \__, |\___|
                                                |___/
"#;

    let version_line = format!("                   v{VERSION} - Disjoint Loadout Engine\n");

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats engine events with colors.
pub struct EngineConsoleLayer;

impl<S: Subscriber> Layer<S> for EngineConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("comboforge_solver") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{output}");
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    items: Option<i64>,
    combo_size: Option<i64>,
    loadout_size: Option<i64>,
    initial_pool_size: Option<i64>,
    round: Option<i64>,
    requested: Option<i64>,
    mined: Option<i64>,
    threshold: Option<i64>,
    exhausted: Option<bool>,
    candidates: Option<i64>,
    champions: Option<i64>,
    greedy: Option<i64>,
    best: Option<i64>,
    proof_bound: Option<i64>,
    pool_size: Option<i64>,
    score: Option<i64>,
    combos: Option<i64>,
    proven: Option<bool>,
    rounds: Option<i64>,
    nodes: Option<i64>,
    elapsed_ms: Option<i64>,
    speed: Option<i64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "event" {
            self.event = Some(format!("{value:?}").trim_matches('"').to_string());
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_i64(field, i64::try_from(value).unwrap_or(i64::MAX));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        let slot = match field.name() {
            "items" => &mut self.items,
            "combo_size" => &mut self.combo_size,
            "loadout_size" => &mut self.loadout_size,
            "initial_pool_size" => &mut self.initial_pool_size,
            "round" => &mut self.round,
            "requested" => &mut self.requested,
            "mined" => &mut self.mined,
            "threshold" => &mut self.threshold,
            "candidates" => &mut self.candidates,
            "champions" => &mut self.champions,
            "greedy" => &mut self.greedy,
            "best" => &mut self.best,
            "proof_bound" => &mut self.proof_bound,
            "pool_size" => &mut self.pool_size,
            "score" => &mut self.score,
            "combos" => &mut self.combos,
            "rounds" => &mut self.rounds,
            "nodes" => &mut self.nodes,
            "elapsed_ms" => &mut self.elapsed_ms,
            "speed" => &mut self.speed,
            _ => return,
        };
        *slot = Some(value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "exhausted" => self.exhausted = Some(value),
            "proven" => self.proven = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "event" {
            self.event = Some(value.to_string());
        }
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "engine_start" => format_engine_start(v),
        "potential_phase" => format_potential_phase(v),
        "mining_phase" => format_mining_phase(v),
        "packing_phase" => format_packing_phase(v),
        "pool_grown" => format_pool_grown(v),
        "pool_cap_reached" => format_pool_cap(v),
        "engine_end" => format_engine_end(v),
        "engine_aborted" => format_engine_aborted(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_count(n: Option<i64>) -> String {
    n.unwrap_or(0).to_formatted_string(&Locale::en)
}

/// Scores below zero mark an absent loadout in the engine's logs.
fn format_score(score: Option<i64>) -> String {
    match score {
        Some(s) if s >= 0 => s.to_formatted_string(&Locale::en).bright_green().to_string(),
        _ => "none".bright_black().to_string(),
    }
}

fn format_engine_start(v: &EventVisitor) -> String {
    mark_run_start();
    format!(
        "{} {} Solving │ {} items │ {} per combo │ {} combos │ pool {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        format_count(v.items).bright_yellow(),
        format_count(v.combo_size).bright_yellow(),
        format_count(v.loadout_size).bright_yellow(),
        format_count(v.initial_pool_size).bright_magenta()
    )
}

fn format_potential_phase(v: &EventVisitor) -> String {
    format!(
        "{} {} {} │ {} items │ {} nodes",
        format_elapsed(),
        "◆".bright_blue(),
        "Potentials".white().bold(),
        format_count(v.items).white(),
        format_count(v.nodes).bright_magenta()
    )
}

fn format_mining_phase(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} {} round {} │ {} / {} combos │ threshold {}",
        format_elapsed(),
        "◆".bright_blue(),
        "Mining".white().bold(),
        format_count(v.round).yellow(),
        format_count(v.mined).white(),
        format_count(v.requested).white(),
        format_score(v.threshold)
    );
    if v.exhausted == Some(true) {
        output.push_str(&format!(" │ {}", "exhausted".bright_yellow()));
    }
    output.push_str(&format_speed(v.speed));
    output
}

fn format_packing_phase(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} {} round {} │ {} candidates │ {} champions │ greedy {} │ best {} │ bound {}",
        format_elapsed(),
        "◆".bright_blue(),
        "Packing".white().bold(),
        format_count(v.round).yellow(),
        format_count(v.candidates).white(),
        format_count(v.champions).white(),
        format_score(v.greedy),
        format_score(v.best),
        format_count(v.proof_bound).bright_magenta()
    );
    output.push_str(&format_speed(v.speed));
    output
}

fn format_speed(speed: Option<i64>) -> String {
    match speed {
        Some(s) if s > 0 => format!(
            " │ {} nodes/s",
            s.to_formatted_string(&Locale::en).bright_magenta().bold()
        ),
        _ => String::new(),
    }
}

fn format_pool_grown(v: &EventVisitor) -> String {
    format!(
        "{} {} pool → {}",
        format_elapsed(),
        "⚡".bright_cyan(),
        format_count(v.pool_size).bright_magenta().bold()
    )
}

fn format_pool_cap(v: &EventVisitor) -> String {
    format!(
        "{} {} Pool cap {} reached │ best {} │ bound {}",
        format_elapsed(),
        "!".bright_yellow().bold(),
        format_count(v.pool_size).bright_yellow(),
        format_score(v.best),
        format_count(v.proof_bound).bright_magenta()
    )
}

fn format_engine_aborted(v: &EventVisitor) -> String {
    format!(
        "{} {} Cancelled after {} rounds │ best {}",
        format_elapsed(),
        "■".bright_red().bold(),
        format_count(v.rounds).yellow(),
        format_score(v.best)
    )
}

fn format_engine_end(v: &EventVisitor) -> String {
    let combos = v.combos.unwrap_or(0);
    let proven = v.proven.unwrap_or(false);
    let score = if combos > 0 { v.score } else { None };

    let status_text = match (combos > 0, proven) {
        (true, true) => "OPTIMAL LOADOUT FOUND",
        (true, false) => "BEST LOADOUT (NOT PROVEN)",
        (false, true) => "NO LOADOUT EXISTS",
        (false, false) => "NO LOADOUT FOUND",
    };

    let mut output = format!(
        "{} {} Solving complete │ {} │ {} rounds │ {} nodes │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_score(score),
        format_count(v.rounds).white(),
        format_count(v.nodes).bright_magenta(),
        format_duration_ms(v.elapsed_ms.unwrap_or(0)).yellow()
    );

    output.push_str("\n\n");
    output.push_str(
        &"╔══════════════════════════════════════════════════════════╗"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    let inner_width: usize = 58;
    let total_pad = inner_width.saturating_sub(status_text.len());
    let left_pad = total_pad / 2;
    let right_pad = total_pad - left_pad;
    let status_colored = if proven && combos > 0 {
        status_text.bright_green().bold().to_string()
    } else {
        status_text.bright_yellow().bold().to_string()
    };
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');

    output.push_str(
        &"╠══════════════════════════════════════════════════════════╣"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    for (label, value) in [
        ("Total Score:", score.map_or_else(|| "-".to_string(), |s| s.to_formatted_string(&Locale::en))),
        ("Combos:", format_count(v.combos)),
        ("Pool Size:", format_count(v.pool_size)),
    ] {
        output.push_str(&format!(
            "{}  {:<18}{:>36}  {}",
            "║".bright_cyan(),
            label,
            value,
            "║".bright_cyan()
        ));
        output.push('\n');
    }

    output.push_str(
        &"╚══════════════════════════════════════════════════════════╝"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    output
}

fn format_duration_ms(ms: i64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{mins}m {secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_mining_phase_shows_speed() {
        let visitor = EventVisitor {
            event: Some("mining_phase".to_string()),
            mined: Some(2_000),
            speed: Some(1_500_000),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor).contains("1,500,000"));
        assert!(format_speed(Some(0)).is_empty());
    }

    #[test]
    fn test_unknown_event_is_silent() {
        let visitor = EventVisitor {
            event: Some("mining_done".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor).is_empty());
    }

    #[test]
    fn test_engine_end_reports_status() {
        let visitor = EventVisitor {
            event: Some("engine_end".to_string()),
            score: Some(12_345),
            combos: Some(3),
            proven: Some(false),
            ..EventVisitor::default()
        };
        let output = format_event(&visitor);
        assert!(output.contains("BEST LOADOUT (NOT PROVEN)"));
        assert!(output.contains("12,345"));
    }
}
