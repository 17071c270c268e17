//! Input parsing and validation for interactive and batch commands.
//!
//! - Player input parsing for `play` (container numbers, deal, switch)
//! - Numeric argument checks used as clap value parsers

use banker_engine::board::ContainerId;
use banker_engine::values::CONTAINER_COUNT;

/// A parsed line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// A container number: picks it during selection, opens it otherwise
    Container(ContainerId),
    Deal,
    NoDeal,
    Keep,
    Switch,
    /// Reprint the board
    Board,
}

/// Result type for parsing user input into player commands.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    Command(PlayerCommand),
    /// User entered quit command (q or quit)
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

/// Parse user input string into a [`PlayerCommand`] or quit.
///
/// Accepted (case-insensitive): `N`, `pick N`, `open N`, `deal`,
/// `no deal`, `keep`, `switch`, `board`, `q`/`quit`.
///
/// # Example
///
/// ```rust
/// # use banker_cli::validation::{parse_player_input, ParseResult, PlayerCommand};
/// use banker_engine::board::ContainerId;
///
/// assert_eq!(
///     parse_player_input("open 12"),
///     ParseResult::Command(PlayerCommand::Container(ContainerId::new(12).unwrap()))
/// );
/// assert_eq!(parse_player_input("No Deal"), ParseResult::Command(PlayerCommand::NoDeal));
/// assert_eq!(parse_player_input("q"), ParseResult::Quit);
///
/// match parse_player_input("open 27") {
///     ParseResult::Invalid(msg) => assert!(msg.contains("1 and 26")),
///     _ => panic!("Expected Invalid"),
/// }
/// ```
pub fn parse_player_input(input: &str) -> ParseResult {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.is_empty() {
        return ParseResult::Invalid("Empty input".to_string());
    }

    match parts.as_slice() {
        ["q"] | ["quit"] => ParseResult::Quit,
        ["deal"] | ["d"] => ParseResult::Command(PlayerCommand::Deal),
        ["no", "deal"] | ["nodeal"] | ["no"] | ["n"] => ParseResult::Command(PlayerCommand::NoDeal),
        ["keep"] | ["k"] => ParseResult::Command(PlayerCommand::Keep),
        ["switch"] | ["s"] => ParseResult::Command(PlayerCommand::Switch),
        ["board"] | ["b"] => ParseResult::Command(PlayerCommand::Board),
        ["pick"] | ["open"] => ParseResult::Invalid(format!(
            "{} requires a container number (e.g., '{} 7')",
            parts[0], parts[0]
        )),
        ["pick", n] | ["open", n] | [n] if n.chars().all(|c| c.is_ascii_digit()) => {
            parse_container(n)
        }
        _ => ParseResult::Invalid(format!(
            "Unrecognized input '{}'. Valid input: <number>, pick <n>, open <n>, deal, no deal, keep, switch, board, q",
            input
        )),
    }
}

fn parse_container(raw: &str) -> ParseResult {
    let out_of_range = || {
        ParseResult::Invalid(format!(
            "Container number must be between 1 and {}",
            CONTAINER_COUNT
        ))
    };
    match raw.parse::<u8>() {
        Ok(n) => ContainerId::new(n)
            .map(|id| ParseResult::Command(PlayerCommand::Container(id)))
            .unwrap_or_else(out_of_range),
        Err(_) => out_of_range(),
    }
}

/// Validate a ratio in `0.0..=1.0`. Usable as a clap value parser.
///
/// ```rust
/// # use banker_cli::validation::parse_ratio;
/// assert_eq!(parse_ratio("0.8"), Ok(0.8));
/// assert!(parse_ratio("1.5").is_err());
/// assert!(parse_ratio("abc").is_err());
/// ```
pub fn parse_ratio(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !(0.0..=1.0).contains(&value) {
        return Err("ratio must be within 0.0..=1.0".into());
    }
    Ok(value)
}

/// Validate a positive session count. Usable as a clap value parser.
pub fn parse_sessions(raw: &str) -> Result<u64, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err("sessions must be >= 1".into()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid session count", raw)),
    }
}
