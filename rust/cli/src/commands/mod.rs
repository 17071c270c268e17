//! Command handler modules for the `banker` CLI.
//!
//! Each command lives in its own module with the same shape:
//!
//! - Public handler function: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Output streams (`&mut dyn Write`) and input readers passed as parameters
//! - Errors propagated via `CliError`; [`crate::run`] prints them once

pub mod cfg;
pub mod play;
pub mod sim;
pub mod stats;
pub mod values;

pub use cfg::handle_cfg_command;
pub use play::handle_play_command;
pub use sim::handle_sim_command;
pub use stats::handle_stats_command;
pub use values::handle_values_command;
