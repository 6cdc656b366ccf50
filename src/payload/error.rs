// ABOUTME: Error types for payload decoding and thread persistence
// ABOUTME: Covers JSON wire-form failures and activity thread file I/O

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Failed to decode payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Invalid thread entry on line {line}: {source}")]
    ThreadEntry {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Thread file error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PayloadError>;
