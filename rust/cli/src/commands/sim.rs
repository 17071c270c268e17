//! Simulation command: plays many sessions with a fixed strategy.
//!
//! The simulated player picks and opens containers uniformly at random,
//! accepts the first offer worth at least `accept_ratio` times the mean of
//! the values still in play (held one included), and flips a coin at the
//! keep-or-switch decision. Every session is reproducible from its seed:
//! session `i` uses `seed + i`.
//!
//! # Examples
//!
//! ```no_run
//! use banker_cli::commands::sim::handle_sim_command;
//! use banker_cli::config::Config;
//! use std::io;
//!
//! let cfg = Config::default();
//! handle_sim_command(
//!     1000,
//!     Some(42),
//!     Some("data/sim.jsonl".to_string()),
//!     None,
//!     &cfg,
//!     &mut io::stdout(),
//!     &mut io::stderr(),
//! )
//! .unwrap();
//! ```

use std::io::Write;
use std::path::PathBuf;

use banker_engine::controller::{GameController, Phase};
use banker_engine::events::SessionSeeds;
use banker_engine::logger::{SessionLogger, SessionRecord};
use banker_engine::stats::Outcome;
use banker_engine::values::Money;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::config::Config;
use crate::error::CliError;
use crate::io_utils::ensure_parent_dir;

/// Per-run totals printed at the end of a simulation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SimSummary {
    pub sessions: u64,
    pub deals: u64,
    pub switched: u64,
    pub total_winnings: u128,
}

impl SimSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.sessions += 1;
        match outcome {
            Outcome::Deal { .. } => self.deals += 1,
            Outcome::Concluded { switched: true, .. } => self.switched += 1,
            Outcome::Concluded { .. } => {}
        }
        self.total_winnings += u128::from(outcome.winnings().cents());
    }

    pub fn mean_winnings(&self) -> Money {
        if self.sessions == 0 {
            return Money::ZERO;
        }
        let mean = self.total_winnings / u128::from(self.sessions);
        Money::from_cents(u64::try_from(mean).unwrap_or(u64::MAX))
    }
}

/// Handle the sim command: run `sessions` automated sessions.
///
/// # Arguments
///
/// * `sessions` - Number of sessions (>= 1)
/// * `seed` - Base seed; falls back to the configured seed, then random
/// * `output` - JSONL file for the session records
/// * `accept_ratio` - Strategy threshold; falls back to the configured ratio
/// * `cfg` - Resolved configuration
pub fn handle_sim_command(
    sessions: u64,
    seed: Option<u64>,
    output: Option<String>,
    accept_ratio: Option<f64>,
    cfg: &Config,
    out: &mut dyn Write,
    _err: &mut dyn Write,
) -> Result<(), CliError> {
    if sessions == 0 {
        return Err(CliError::InvalidInput("sessions must be >= 1".to_string()));
    }
    let accept_ratio = accept_ratio.unwrap_or(cfg.accept_ratio);
    if !(0.0..=1.0).contains(&accept_ratio) {
        return Err(CliError::InvalidInput(
            "accept ratio must be within 0.0..=1.0".to_string(),
        ));
    }
    let base_seed = seed.or(cfg.seed).unwrap_or_else(rand::random);

    let mut logger = match output {
        Some(p) => {
            let path = PathBuf::from(p);
            ensure_parent_dir(&path).map_err(|e| CliError::Io(std::io::Error::other(e)))?;
            Some(SessionLogger::create(&path)?)
        }
        None => None,
    };

    writeln!(
        out,
        "sim: sessions={} seed={} accept_ratio={}",
        sessions, base_seed, accept_ratio
    )?;

    let mut summary = SimSummary::default();
    for i in 0..sessions {
        let session_seed = base_seed.wrapping_add(i);
        let game = play_session(session_seed, accept_ratio, cfg.aggressiveness_bps())?;
        if let Some(outcome) = game.outcome() {
            summary.record(outcome);
        }
        if let Some(l) = logger.as_mut() {
            let record = SessionRecord::from_controller(l.next_id(), &game);
            l.write(&record)?;
        }
    }

    tracing::info!(
        sessions = summary.sessions,
        deals = summary.deals,
        "simulation finished"
    );
    writeln!(out, "Simulated: {} sessions", summary.sessions)?;
    writeln!(out, "Deals: {}", summary.deals)?;
    writeln!(out, "Switched: {}", summary.switched)?;
    writeln!(out, "Mean winnings: {}", summary.mean_winnings())?;
    Ok(())
}

/// Plays one session to its end with the threshold strategy.
pub fn play_session(
    seed: u64,
    accept_ratio: f64,
    aggressiveness_bps: u32,
) -> Result<GameController, CliError> {
    let mut game = GameController::builder()
        .seeds(SessionSeeds::from_seed(seed))
        .aggressiveness_bps(aggressiveness_bps)
        .build()?;
    // strategy stream kept apart from the shuffle stream
    let mut rng = ChaCha20Rng::seed_from_u64(seed.rotate_left(32));

    while !game.phase().is_terminal() {
        match game.phase() {
            Phase::Selecting | Phase::Playing => {
                let Some(&id) = game.available_for_elimination().choose(&mut rng) else {
                    return Err(CliError::Engine("no container left to open".to_string()));
                };
                if game.phase() == Phase::Selecting {
                    game.select_container(id)?;
                } else {
                    game.eliminate_container(id)?;
                }
            }
            Phase::OfferPresented => {
                if should_accept(&game, accept_ratio) {
                    game.accept_offer()?;
                } else {
                    game.reject_offer()?;
                }
            }
            Phase::SwitchDecision => {
                game.choose_switch(rng.random_bool(0.5))?;
            }
            Phase::DealAccepted | Phase::Concluded => break,
        }
    }
    Ok(game)
}

fn should_accept(game: &GameController, accept_ratio: f64) -> bool {
    let Some(offer) = game.last_offer() else {
        return false;
    };
    let expected = game.stats().expected_value();
    offer.amount.cents() as f64 >= accept_ratio * expected.cents() as f64
}
