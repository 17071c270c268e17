//! Statistics aggregation over JSONL session logs.
//!
//! Reads one file, or every `.jsonl` file under a directory, and reports
//! how sessions ended: deals taken, how often players switched, and mean
//! winnings. An unterminated final line is treated as an interrupted write
//! and discarded; any other unparsable line counts as corrupted.

use std::io::Write;
use std::path::Path;

use banker_engine::logger::SessionRecord;
use banker_engine::stats::Outcome;
use banker_engine::values::Money;

use crate::error::CliError;
use crate::io_utils::read_text;
use crate::ui;

#[derive(Debug, Default)]
struct StatsState {
    sessions: u64,
    abandoned: u64,
    deals: u64,
    decisions: u64,
    switched: u64,
    switch_wins: u64,
    winnings: u128,
    skipped: u64,
    corrupted: u64,
}

impl StatsState {
    fn add(&mut self, rec: &SessionRecord) {
        self.sessions += 1;
        let Some(outcome) = &rec.outcome else {
            self.abandoned += 1;
            return;
        };
        self.winnings += u128::from(outcome.winnings().cents());
        match outcome {
            Outcome::Deal { .. } => self.deals += 1,
            Outcome::Concluded {
                final_value,
                other_value,
                switched,
                ..
            } => {
                self.decisions += 1;
                if *switched {
                    self.switched += 1;
                    if final_value > other_value {
                        self.switch_wins += 1;
                    }
                }
            }
        }
    }

    fn finished(&self) -> u64 {
        self.sessions - self.abandoned
    }

    fn consume(&mut self, content: &str) {
        let mut lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        if !content.ends_with('\n')
            && let Some(last) = lines.last()
            && serde_json::from_str::<SessionRecord>(last).is_err()
        {
            lines.pop();
            self.skipped += 1;
        }
        for line in lines {
            let rec: SessionRecord = crate::parse_json_or_continue!(line, self.corrupted);
            self.add(&rec);
        }
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Aggregates statistics from a JSONL session log or a directory of them.
///
/// # Returns
///
/// `Ok(())` when at least one record was read, otherwise an `Err` that maps
/// to exit code `2`.
pub fn handle_stats_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let path = Path::new(&input);
    let mut state = StatsState::default();

    if path.is_dir() {
        let mut stack = vec![path.to_path_buf()];
        while let Some(d) = stack.pop() {
            let Ok(rd) = std::fs::read_dir(&d) else {
                continue;
            };
            for e in rd.filter_map(Result::ok) {
                let p = e.path();
                if p.is_dir() {
                    stack.push(p);
                } else if p.extension().is_some_and(|ext| ext == "jsonl") {
                    match read_text(&p) {
                        Ok(content) => state.consume(&content),
                        Err(_) => state.corrupted += 1,
                    }
                }
            }
        }
    } else {
        let content = read_text(path)
            .map_err(|e| CliError::InvalidInput(format!("Failed to read {}: {}", input, e)))?;
        state.consume(&content);
    }

    if state.corrupted > 0 {
        ui::display_warning(
            err,
            &format!("Skipped {} corrupted record(s)", state.corrupted),
        )?;
    }
    if state.skipped > 0 {
        ui::display_warning(
            err,
            &format!("Discarded {} incomplete final line(s)", state.skipped),
        )?;
    }
    if state.sessions == 0 && (state.corrupted > 0 || state.skipped > 0) {
        return Err(CliError::InvalidInput("No valid session records".to_string()));
    }

    let finished = state.finished();
    let mean = if finished == 0 {
        Money::ZERO
    } else {
        Money::from_cents(u64::try_from(state.winnings / u128::from(finished)).unwrap_or(u64::MAX))
    };
    let summary = serde_json::json!({
        "sessions": state.sessions,
        "abandoned": state.abandoned,
        "deals": state.deals,
        "deal_rate": ratio(state.deals, finished),
        "switch_decisions": state.decisions,
        "switch_rate": ratio(state.switched, state.decisions),
        "switch_win_rate": ratio(state.switch_wins, state.switched),
        "mean_winnings": mean.to_string(),
        "mean_winnings_cents": mean.cents(),
    });
    let json_output = serde_json::to_string_pretty(&summary)
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize stats: {}", e)))?;
    writeln!(out, "{}", json_output)?;
    Ok(())
}
