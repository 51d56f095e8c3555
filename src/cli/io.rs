//! JSON I/O handling for CLI
//!
//! - Input: one JSON object on the first line
//! - `decode` output: one `{"status": ...}` object per line
//! - `demo` output: labelled sections, pretty-printed
//!
//! Functions take their reader / writer so commands pass the locked
//! stdin / stdout and tests pass buffers.

use std::fmt::Debug;
use std::io::{BufRead, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read one JSON request line
pub fn read_request(mut input: impl BufRead) -> CliResult<Value> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::EmptyInput);
    }
    Ok(serde_json::from_str(&line)?)
}

/// Write `{"status":"ok","data":..}`
pub fn write_response(out: &mut impl Write, data: Value) -> CliResult<()> {
    write_line(out, &json!({ "status": "ok", "data": data }))
}

/// Write `{"status":"error","code":..,"message":..}`
pub fn write_error(out: &mut impl Write, code: &str, message: &str) -> CliResult<()> {
    write_line(
        out,
        &json!({ "status": "error", "code": code, "message": message }),
    )
}

/// Write a labelled, pretty-printed JSON section
pub fn write_section(out: &mut impl Write, label: &str, value: &Value) -> CliResult<()> {
    writeln!(out, "{}:", label)?;
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out, "\n")?;
    Ok(out.flush()?)
}

/// Write a labelled `Debug` rendering
pub fn write_debug(out: &mut impl Write, label: &str, value: &dyn Debug) -> CliResult<()> {
    writeln!(out, "{}:\n{:#?}\n", label, value)?;
    Ok(out.flush()?)
}

fn write_line(out: &mut impl Write, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, response)?;
    writeln!(out)?;
    Ok(out.flush()?)
}
