//! Reading samples from text files.
//!
//! A sample file holds numbers separated by whitespace or commas. Anything
//! after a `#` on a line is ignored.

use std::path::{Path, PathBuf};

use hypotest_core::Sample;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read sample file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: '{token}' is not a number")]
    Parse { line: usize, token: String },
}

/// Parse a sample from text.
pub fn parse_sample(text: &str) -> Result<Sample, InputError> {
    let mut values = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or_default();
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let value = token.parse::<f64>().map_err(|_| InputError::Parse {
                line: index + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }
    }

    Ok(Sample::new(values))
}

/// Read a sample from a file.
pub fn read_sample(path: &Path) -> Result<Sample, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sample(&text)
}
