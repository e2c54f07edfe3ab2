//! Line prompts that re-ask on recoverable input errors.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use lexflow_registry::RegistryResult;

/// Writes `prompt` and returns the trimmed answer.
///
/// # Errors
///
/// Fails if the input is closed before a line arrives.
pub fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<String> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        bail!("input closed");
    }
    Ok(line.trim().to_string())
}

/// Prompts until `parse` accepts the answer.
///
/// Recoverable registry errors are shown and the question is asked again;
/// fatal ones are returned.
pub fn ask_until<R, W, T, F>(input: &mut R, out: &mut W, prompt: &str, parse: F) -> Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> RegistryResult<T>,
{
    loop {
        let answer = ask(input, out, prompt)?;
        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_fatal() => writeln!(out, "{e}. Try again.")?,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Returns true for `y` or `yes`, case-insensitively.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
