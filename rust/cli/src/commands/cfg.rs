//! Configuration command handler.
//!
//! Prints the resolved configuration with the source of every value
//! (default, file or environment) as pretty JSON:
//!
//! ```json
//! {
//!   "seed": { "value": null, "source": "default" },
//!   "aggressiveness": { "value": 1.0, "source": "env" },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use std::io::Write;

/// Handle the cfg command.
///
/// # Errors
///
/// Returns `CliError::Config` if configuration loading fails.
/// Returns `CliError::Io` if writing to output stream fails.
pub fn handle_cfg_command(out: &mut dyn Write, _err: &mut dyn Write) -> Result<(), CliError> {
    let config::ConfigResolved { config, sources } = config::load_with_sources()
        .map_err(|e| CliError::Config(format!("Invalid configuration: {}", e)))?;

    let display = serde_json::json!({
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "aggressiveness": {
            "value": config.aggressiveness,
            "source": sources.aggressiveness,
        },
        "accept_ratio": {
            "value": config.accept_ratio,
            "source": sources.accept_ratio,
        },
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
