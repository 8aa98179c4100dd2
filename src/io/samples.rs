//! Plain-text sample files.
//!
//! Format: numbers separated by newlines, commas or whitespace. `#` starts a
//! comment that runs to the end of the line. Every token must parse as a
//! finite number; the first bad token is reported with its line number.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AppError;

/// Read samples from `path`.
pub fn read_samples(path: &Path) -> Result<Vec<f64>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read samples '{}': {e}", path.display())))?;
    let values = parse_samples(&text).map_err(|msg| AppError::new(2, format!("{}: {msg}", path.display())))?;
    tracing::debug!(path = %path.display(), n = values.len(), "read samples");
    Ok(values)
}

/// Parse sample text; the error names the offending line.
pub fn parse_samples(text: &str) -> Result<Vec<f64>, String> {
    let mut values = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let content = line.split('#').next().unwrap_or("");
        for token in content.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            let value: f64 = token
                .parse()
                .map_err(|_| format!("line {line_no}: '{token}' is not a number"))?;
            if !value.is_finite() {
                return Err(format!("line {line_no}: '{token}' is not finite"));
            }
            values.push(value);
        }
    }
    Ok(values)
}

/// Write one value per line, with full round-trip precision.
pub fn write_samples(path: &Path, values: &[f64]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create samples file '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    for v in values {
        writeln!(out, "{v}").map_err(|e| AppError::new(2, format!("Failed to write samples: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write samples: {e}")))?;
    Ok(())
}
