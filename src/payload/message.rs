// ABOUTME: Outbound activity messages and the per-instance activity thread
// ABOUTME: One message is prepared per committed tick; the thread feeds the next tick's baseline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::Path;

use super::error::{PayloadError, Result};
use super::Payload;

/// The message produced by one committed tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMessage {
    pub id: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub envelope: Payload,
}

impl ActivityMessage {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            created: Utc::now(),
            message: String::new(),
            template: template.into(),
            envelope: Payload::new(),
        }
    }

    /// Assign a fresh message id and creation time.
    pub fn prepare(&mut self) {
        self.id = uuid::Uuid::new_v4().to_string();
        self.created = Utc::now();
    }

    pub fn is_prepared(&self) -> bool {
        !self.id.is_empty()
    }
}

/// A running workflow instance and the messages it has committed so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub thread: Vec<ActivityMessage>,
}

impl Activity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            thread: Vec::new(),
        }
    }

    pub fn last_entry(&self) -> Option<&ActivityMessage> {
        self.thread.last()
    }

    pub fn record(&mut self, message: ActivityMessage) {
        self.thread.push(message);
    }

    /// Read a thread stored as JSON Lines, one message per line. Blank lines are skipped.
    pub fn load_thread<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut loaded = 0;
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let message: ActivityMessage =
                serde_json::from_str(&line).map_err(|source| PayloadError::ThreadEntry {
                    line: index + 1,
                    source,
                })?;
            self.thread.push(message);
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn load_thread_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let file = std::fs::File::open(path.as_ref())?;
        self.load_thread(std::io::BufReader::new(file))
    }

    /// Append one message to a JSON Lines thread file, creating it if needed.
    pub fn append_to_file<P: AsRef<Path>>(path: P, message: &ActivityMessage) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        let line = serde_json::to_string(message).map_err(PayloadError::Encode)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
