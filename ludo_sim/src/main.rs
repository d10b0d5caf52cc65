//! Self-play driver for the Ludo engine.
//!
//! Spawns sessions through the SessionManager and lets bots play them
//! concurrently, or prints token placements for renderer calibration.

mod bot;
mod config;
mod logging;

use std::collections::BTreeMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::{Error, anyhow};
use ctrlc::set_handler;
use ludo_engine::{
    BoardTopology, Color, GameError, GameSession, PlayerId, SessionError, SessionManager,
    SessionStatus, SystemDice,
    render::{RenderConfig, token_placements},
};
use pico_args::Arguments;
use rand::{SeedableRng, rngs::StdRng};
use tracing::{error, info, warn};

use config::{Overrides, SimConfig};

const HELP: &str = "\
Play self-driven Ludo matches against the engine

USAGE:
  ludo_sim [OPTIONS]

OPTIONS:
  --games      N           Matches to play concurrently  [default: env LUDO_GAMES or 1]
  --players    N           Seats per match, 2 or 4       [default: env LUDO_PLAYERS or 2]
  --stake      CENTS       Bet per player                [default: env LUDO_STAKE or 0]
  --max-moves  N           End a match after N moves     [default: env LUDO_MAX_MOVES or 500]

FLAGS:
  --calibrate              Print token placements of a sample match as JSON and exit
  -h, --help               Print help information

ENVIRONMENT:
  LUDO_TIME_LIMIT_SECS     Match clock in seconds
  LUDO_RAKE_BPS            House cut in basis points
  RUST_LOG                 Log filter (e.g., info,ludo_engine=debug)
";

/// How one match went
struct MatchReport {
    moves: usize,
    leader: Color,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let calibrate = pargs.contains("--calibrate");
    let overrides = Overrides {
        games: pargs.opt_value_from_str("--games")?,
        players: pargs.opt_value_from_str("--players")?,
        stake: pargs.opt_value_from_str("--stake")?,
        max_moves: pargs.opt_value_from_str("--max-moves")?,
    };

    let config = SimConfig::from_env(overrides);
    config.validate()?;

    logging::init();

    if calibrate {
        return print_calibration(&config);
    }

    // Catching signals for a clean stop between moves.
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    set_handler(move || stop_flag.store(true, Ordering::SeqCst))?;

    let manager = Arc::new(SessionManager::new(config.session.clone())?);
    info!(
        "Playing {} match(es): {} players, stake {}",
        config.games, config.players, config.stake
    );

    let mut tasks = Vec::with_capacity(config.games);
    for _ in 0..config.games {
        let manager = manager.clone();
        let config = config.clone();
        let stop = stop.clone();
        tasks.push(tokio::spawn(async move {
            play_match(&manager, &config, &stop).await
        }));
    }

    let mut wins: BTreeMap<Color, usize> = BTreeMap::new();
    let mut total_moves = 0;
    for task in tasks {
        match task.await? {
            Ok(report) => {
                total_moves += report.moves;
                *wins.entry(report.leader).or_default() += 1;
            }
            Err(e) => error!("Match failed: {e:#}"),
        }
    }

    let leftover = manager.close_finished_sessions().await;
    if !leftover.is_empty() {
        warn!("Closed {} ended session(s) left by failed matches", leftover.len());
    }

    for (color, count) in &wins {
        info!("{color} led {count} match(es)");
    }
    info!(
        "Done: {} match(es), {} moves, {} session(s) still open",
        wins.values().sum::<usize>(),
        total_moves,
        manager.active_session_count().await
    );

    Ok(())
}

fn seats(players: usize) -> BTreeMap<Color, PlayerId> {
    let colors: &[Color] = if players == 4 {
        &Color::ALL
    } else {
        &Color::TWO_PLAYER
    };
    colors
        .iter()
        .map(|&color| (color, PlayerId::new(&format!("bot-{color}"))))
        .collect()
}

/// Drive one match to its end, then close it
async fn play_match(
    manager: &SessionManager,
    config: &SimConfig,
    stop: &AtomicBool,
) -> Result<MatchReport, Error> {
    let id = manager
        .create_session(seats(config.players), config.stake)
        .await?;
    let mut rng = StdRng::from_os_rng();
    let mut moves = 0;

    while moves < config.max_moves && !stop.load(Ordering::SeqCst) {
        let snapshot = manager.snapshot(&id).await?;
        if snapshot.status.is_terminal() {
            break;
        }

        let color = snapshot.turn;
        let dice = manager.roll(&id, color).await?;
        let slot = bot::choose_pawn(&snapshot, color, dice, manager.topology(), &mut rng)
            .ok_or_else(|| anyhow!("{color} has no pawns in session {id}"))?;
        manager.move_pawn(&id, color, slot).await?;
        moves += 1;
    }

    // The clock may have finished the match already.
    let last = match manager.end_session(&id, SessionStatus::Finished).await {
        Ok(snapshot) => snapshot,
        Err(SessionError::Game(GameError::SessionNotPlaying)) => manager.snapshot(&id).await?,
        Err(e) => return Err(e.into()),
    };
    let leader = GameSession::from_snapshot(last.clone(), manager.topology())?.leader();

    logging::log_match_summary(&last, moves, &leader.to_string());
    if let Err(e) = manager.close_session(&id).await {
        warn!("Failed to close session {id}: {e}");
    }

    Ok(MatchReport { moves, leader })
}

/// Play a few bot turns offline and dump where every token is drawn
fn print_calibration(config: &SimConfig) -> Result<(), Error> {
    let board = BoardTopology::standard();
    let render = RenderConfig::default();
    render.validate().map_err(|e| anyhow!(e))?;

    let mut game = GameSession::with_settings(
        seats(config.players),
        config.stake,
        &config.session.game_settings(),
    )?;
    let mut rng = StdRng::from_os_rng();
    for _ in 0..config.max_moves.min(40) {
        let color = game.turn();
        let dice = game.roll_with(color, &mut SystemDice)?;
        let slot = bot::choose_pawn(&game.snapshot(), color, dice, board, &mut rng)
            .ok_or_else(|| anyhow!("{color} has no pawns"))?;
        game.apply_move(color, slot, board)?;
    }

    let placements = token_placements(&game.snapshot(), board, &render);
    println!("{}", serde_json::to_string_pretty(&placements)?);
    info!("Printed {} token placement(s)", placements.len());

    Ok(())
}
