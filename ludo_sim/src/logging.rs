//! Structured logging configuration.
//!
//! The engine logs through the `log` facade; `init` installs a tracing
//! subscriber that also captures those records.

use ludo_engine::SessionSnapshot;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Levels are configurable via the RUST_LOG env var.
///
/// # Example
///
/// ```no_run
/// logging::init();
/// tracing::info!("Simulator starting");
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ludo_engine=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log the result of a finished match
///
/// # Arguments
///
/// * `snapshot` - Final state of the match
/// * `moves` - Moves played
/// * `leader` - Color holding the top score
pub fn log_match_summary(snapshot: &SessionSnapshot, moves: usize, leader: &str) {
    let scores = snapshot
        .scores
        .iter()
        .map(|(color, score)| format!("{color}={score}"))
        .collect::<Vec<_>>()
        .join(" ");

    tracing::info!(
        session_id = %snapshot.id,
        status = %snapshot.status,
        moves = moves,
        time_left_secs = snapshot.time_left_secs,
        prize = snapshot.prize_amount,
        leader = leader,
        "Match over: {}",
        scores
    );
}
