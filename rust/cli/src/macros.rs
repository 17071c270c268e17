//! Macros for common CLI error handling patterns.

/// Write to a stream and exit with error code if writing fails.
///
/// # Examples
///
/// ```ignore
/// write_or_exit!(err, "Error: {}", message);
/// ```
#[macro_export]
macro_rules! write_or_exit {
    ($dest:expr, $($arg:tt)*) => {
        if writeln!($dest, $($arg)*).is_err() {
            return $crate::exit_code::ERROR;
        }
    };
}

/// Parse a JSON line or continue to the next iteration on error.
///
/// The error counter named by `$bad` is incremented before continuing.
///
/// # Examples
///
/// ```ignore
/// let record: SessionRecord = parse_json_or_continue!(line, corrupted);
/// ```
#[macro_export]
macro_rules! parse_json_or_continue {
    ($line:expr, $bad:expr) => {
        match serde_json::from_str($line) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unparsable record");
                $bad += 1;
                continue;
            }
        }
    };
}
