//! CLI subcommand implementations.

pub mod auth;
pub mod documents;
pub mod list;
pub mod period;

use anyhow::{bail, Result};

/// Splits a `key=value` argument.
pub(crate) fn parse_pair(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("expected key=value, got '{}'", raw),
    }
}
