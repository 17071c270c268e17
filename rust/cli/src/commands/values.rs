//! Prints the denomination table every session deals from.

use crate::error::CliError;
use banker_engine::values::{ValueSet, CONTAINER_COUNT};
use std::io::Write;

pub fn handle_values_command(out: &mut dyn Write) -> Result<(), CliError> {
    let values = ValueSet::standard();
    writeln!(out, "{} containers, one value each:", CONTAINER_COUNT)?;
    for (i, v) in values.as_slice().iter().enumerate() {
        writeln!(out, "{:>3}. {:>12}", i + 1, v.to_string())?;
    }
    let total: u64 = values.as_slice().iter().map(|v| v.cents()).sum();
    writeln!(
        out,
        "Total: {}",
        banker_engine::values::Money::from_cents(total)
    )?;
    Ok(())
}
