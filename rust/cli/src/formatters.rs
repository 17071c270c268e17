//! Text rendering of game events, the container grid and the value board.
//!
//! Pure functions over engine types; commands decide where the text goes.

use banker_engine::board::ContainerId;
use banker_engine::controller::GameController;
use banker_engine::events::GameEvent;
use banker_engine::stats::Outcome;
use banker_engine::values::{Money, ValueSet};

const GRID_COLUMNS: usize = 7;

/// One line describing `event`.
///
/// ```rust
/// use banker_cli::formatters::format_event;
/// use banker_engine::board::ContainerId;
/// use banker_engine::events::GameEvent;
/// use banker_engine::values::Money;
///
/// let e = GameEvent::ContainerEliminated {
///     id: ContainerId::new(9).unwrap(),
///     value: Money::from_units(750),
/// };
/// assert_eq!(format_event(&e), "Container #9 held $750");
/// ```
pub fn format_event(event: &GameEvent) -> String {
    match event {
        GameEvent::SessionStarted { session, .. } => format!("Session {} started", session),
        GameEvent::ContainerSelected { id } => format!("You hold container #{}", id),
        GameEvent::ContainerEliminated { id, value } => {
            format!("Container #{} held {}", id, value)
        }
        GameEvent::OfferMade {
            amount,
            round,
            tone,
        } => format!("Banker's offer (round {}): {} [{}]", round, amount, tone),
        GameEvent::RoundAdvanced { round, quota } => format!(
            "Round {}: open {} container{}",
            round,
            quota,
            if *quota == 1 { "" } else { "s" }
        ),
        GameEvent::DealAccepted { amount, held_value } => {
            format!("Deal! You sold for {}; your container held {}", amount, held_value)
        }
        GameEvent::SwitchOffered { other_id, held_id } => format!(
            "Two containers left: keep #{} or switch to #{}",
            held_id, other_id
        ),
        GameEvent::SessionConcluded {
            final_value,
            switched,
        } => format!(
            "You {} and won {}",
            if *switched { "switched" } else { "kept" },
            final_value
        ),
    }
}

/// Grid of container numbers: `[n]` held, `--` opened, plain number sealed.
pub fn format_grid(game: &GameController) -> String {
    let held = game.held_id();
    let cells: Vec<String> = ContainerId::all()
        .map(|id| {
            if Some(id) == held {
                format!("[{:>2}]", id.get())
            } else if game.is_available(id) {
                format!(" {:>2} ", id.get())
            } else {
                "  --".to_string()
            }
        })
        .collect();
    cells
        .chunks(GRID_COLUMNS)
        .map(|row| row.join(" ").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Value table with opened values struck out as `x`.
pub fn format_value_board(values: &ValueSet, eliminated: &[Money]) -> String {
    let (low, high) = values.as_slice().split_at(values.len() / 2);
    let cell = |v: &Money| {
        let mark = if eliminated.contains(v) { 'x' } else { ' ' };
        format!("{} {:>12}", mark, v.to_string())
    };
    low.iter()
        .zip(high.iter())
        .map(|(l, h)| format!("{}    {}", cell(l), cell(h)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Deal {
            amount,
            held_value,
            round,
        } => {
            let verdict = if amount >= held_value {
                "beat"
            } else {
                "fell short of"
            };
            format!(
                "Result: deal in round {} for {}, which {} your container ({})",
                round, amount, verdict, held_value
            )
        }
        Outcome::Concluded {
            held_id,
            final_value,
            other_value,
            ..
        } => format!(
            "Result: container #{} paid {}; the other held {}",
            held_id, final_value, other_value
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banker_engine::events::SessionSeeds;

    #[test]
    fn grid_marks_held_and_opened() {
        let mut game = GameController::builder()
            .seeds(SessionSeeds::from_seed(1))
            .build()
            .unwrap();
        game.select_container(ContainerId::new(3).unwrap()).unwrap();
        game.eliminate_container(ContainerId::new(1).unwrap())
            .unwrap();
        let grid = format_grid(&game);
        assert_eq!(grid.lines().count(), 4);
        let first = grid.lines().next().unwrap();
        assert!(first.starts_with("  --"), "{}", first);
        assert!(first.contains("[ 3]"), "{}", first);
        assert!(first.contains("  2"), "{}", first);
    }

    #[test]
    fn value_board_strikes_opened_values() {
        let values = ValueSet::standard();
        let board = format_value_board(&values, &[Money::from_units(750)]);
        assert_eq!(board.lines().count(), 13);
        assert!(board.contains(&format!("x {:>12}", "$750")), "{}", board);
        assert!(board.contains(&format!("  {:>12}", "$0.01")), "{}", board);
        assert!(board.contains("$1,000,000"));
    }

    #[test]
    fn events_read_naturally() {
        let e = GameEvent::RoundAdvanced { round: 6, quota: 1 };
        assert_eq!(format_event(&e), "Round 6: open 1 container");
        let e = GameEvent::SessionConcluded {
            final_value: Money::from_units(5),
            switched: true,
        };
        assert_eq!(format_event(&e), "You switched and won $5");
    }
}
