//! Demo inputs used when a command is given neither a file nor piped stdin

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use anyhow::{Context, Result};

pub const CODE: &str = include_str!("../samples/get_user_data.py");
pub const ARTICLE: &str = include_str!("../samples/article.md");
pub const PRODUCT: &str = include_str!("../samples/product.txt");
pub const CONTACTS: &str = include_str!("../samples/contacts.txt");
pub const FINANCIAL: &str = include_str!("../samples/financial.txt");
pub const EVENTS: &str = include_str!("../samples/events.txt");

/// Read `path`, else piped stdin, else fall back to `sample`
pub fn read_input(path: Option<&Path>, sample: &str) -> Result<String> {
    if let Some(path) = path {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut buffer = String::new();
        stdin
            .lock()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        if !buffer.trim().is_empty() {
            return Ok(buffer);
        }
    }

    Ok(sample.to_string())
}
