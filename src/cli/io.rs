//! Line-oriented JSON I/O
//!
//! - Input: one JSON request per line; blank lines are skipped
//! - Output: one JSON object per line, flushed after each
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Non-blank request lines from `input`
pub fn read_requests<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<String>> {
    input
        .lines()
        .map(|line| line.map_err(CliError::from))
        .filter(|line| !matches!(line, Ok(text) if text.trim().is_empty()))
}

pub fn write_response<W: Write>(output: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    serde_json::to_writer(&mut *output, &response)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub fn write_error<W: Write>(output: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    serde_json::to_writer(&mut *output, &response)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

/// Write an already rendered JSON line
pub fn write_json<W: Write>(output: &mut W, json: &str) -> CliResult<()> {
    writeln!(output, "{}", json)?;
    output.flush()?;
    Ok(())
}
