use serde::de::DeserializeOwned;
use std::io::{self, Read};

use super::file::parse_config;

/// Read piped assumptions from stdin. JSON when the payload starts with `{`,
/// YAML otherwise. Returns None if stdin is a TTY (interactive) or empty.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped<T: DeserializeOwned>(buffer: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let yaml = !trimmed.starts_with('{');
    Ok(Some(parse_config(trimmed, yaml)?))
}
