use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use claude_kit::models::message::Message;

/// Write the whole transcript, one JSON message per line
pub fn persist_messages(session_file: &Path, messages: &[Message]) -> Result<()> {
    if let Some(parent) = session_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(session_file)?; // Create or truncate the file
    persist_messages_internal(file, messages)
}

fn persist_messages_internal(session_file: File, messages: &[Message]) -> Result<()> {
    let mut writer = std::io::BufWriter::new(session_file);

    for message in messages {
        serde_json::to_writer(&mut writer, &message)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read a transcript written by [`persist_messages`]. A missing file is an empty transcript.
pub fn load_messages(session_file: &Path) -> Result<Vec<Message>> {
    if !session_file.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(session_file)
        .with_context(|| format!("Failed to open session file {}", session_file.display()))?;

    let mut messages = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let message = serde_json::from_str(&line).with_context(|| {
            format!(
                "Invalid message on line {} of {}",
                index + 1,
                session_file.display()
            )
        })?;
        messages.push(message);
    }
    Ok(messages)
}
