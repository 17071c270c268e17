//! # Play Command
//!
//! One interactive session on a text terminal. The player picks a
//! container, opens containers round by round, answers each offer with
//! `deal` or `no deal`, and at the last two containers chooses `keep` or
//! `switch`. `q` or end of input abandons the session.
//!
//! Rejected input never ends the session; the reason goes to stderr and
//! the prompt repeats.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use banker_engine::controller::{GameController, Phase};
use banker_engine::events::{GameEvent, SessionSeeds};
use banker_engine::logger::{SessionLogger, SessionRecord};

use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{format_event, format_grid, format_outcome, format_value_board};
use crate::io_utils::{count_records, ensure_parent_dir, read_stdin_line};
use crate::ui;
use crate::validation::{ParseResult, PlayerCommand, parse_player_input};

/// Handle the play command.
///
/// # Arguments
///
/// * `seed` - Session seed; falls back to the configured seed, then random
/// * `log` - JSONL file the finished (or abandoned) session is appended to
/// * `cfg` - Resolved configuration (banker aggressiveness)
/// * `out` - Game display
/// * `err` - Rejected input and warnings
/// * `stdin` - Player input
pub fn handle_play_command(
    seed: Option<u64>,
    log: Option<String>,
    cfg: &Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let seed = seed.or(cfg.seed).unwrap_or_else(rand::random);
    let mut game = GameController::builder()
        .seeds(SessionSeeds::from_seed(seed))
        .aggressiveness_bps(cfg.aggressiveness_bps())
        .build()?;

    writeln!(out, "play: seed={}", seed)?;
    show_board(&game, out)?;

    let finished = run_session(&mut game, out, err, stdin)?;
    if let Some(outcome) = game.outcome() {
        writeln!(out, "{}", format_outcome(outcome))?;
    }
    if !finished {
        writeln!(out, "Session abandoned.")?;
    }

    if let Some(path) = log {
        write_record(&game, PathBuf::from(path))?;
    }
    Ok(())
}

/// Drives the session until it ends; `false` when the player quit first.
fn run_session(
    game: &mut GameController,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<bool, CliError> {
    while !game.phase().is_terminal() {
        ui::prompt(out, &prompt_for(game))?;
        let Some(line) = read_stdin_line(stdin) else {
            writeln!(out)?;
            return Ok(false);
        };
        let command = match parse_player_input(&line) {
            ParseResult::Command(c) => c,
            ParseResult::Quit => return Ok(false),
            ParseResult::Invalid(msg) => {
                ui::write_error(err, &msg)?;
                continue;
            }
        };

        let outcome = match command {
            PlayerCommand::Board => {
                show_board(game, out)?;
                continue;
            }
            PlayerCommand::Container(id) if game.phase() == Phase::Selecting => {
                game.select_container(id)
            }
            PlayerCommand::Container(id) => game.eliminate_container(id),
            PlayerCommand::Deal => game.accept_offer(),
            PlayerCommand::NoDeal => game.reject_offer(),
            PlayerCommand::Keep => game.choose_switch(false),
            PlayerCommand::Switch => game.choose_switch(true),
        };

        match outcome {
            Ok(events) => {
                for event in &events {
                    writeln!(out, "{}", format_event(event))?;
                }
                if events
                    .iter()
                    .any(|e| matches!(e, GameEvent::RoundAdvanced { .. }))
                {
                    show_board(game, out)?;
                }
            }
            Err(e) if e.is_illegal_intent() => ui::write_error(err, &e.to_string())?,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

fn prompt_for(game: &GameController) -> String {
    match game.phase() {
        Phase::Selecting => "Pick your container (1-26): ".to_string(),
        Phase::Playing => format!(
            "Round {}: open a container ({} to go): ",
            game.round(),
            game.quota() - game.eliminated_this_round()
        ),
        Phase::OfferPresented => "Deal or no deal? ".to_string(),
        Phase::SwitchDecision => "Keep or switch? ".to_string(),
        Phase::DealAccepted | Phase::Concluded => String::new(),
    }
}

fn show_board(game: &GameController, out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(out, "{}", format_grid(game))?;
    writeln!(
        out,
        "{}",
        format_value_board(game.value_set(), &game.eliminated_values())
    )?;
    Ok(())
}

fn write_record(game: &GameController, path: PathBuf) -> Result<(), CliError> {
    ensure_parent_dir(&path).map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    let mut logger = SessionLogger::append(&path, count_records(&path))?;
    let record = SessionRecord::from_controller(logger.next_id(), game);
    logger.write(&record)?;
    tracing::info!(path = %path.display(), session_id = %record.session_id, "session logged");
    Ok(())
}
