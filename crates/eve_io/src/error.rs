//! Errors raised by the frame log, archives and JSON helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blank text handed to a JSON decoder.
    #[error("Empty JSON input")]
    EmptyJson,

    /// An rkyv archive could not be written, validated or read back.
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Frame log error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The storage worker thread is gone.
    #[error("Storage thread stopped")]
    Disconnected,

    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    #[must_use]
    pub fn archive<S: Into<String>>(msg: S) -> Self {
        Self::Archive(msg.into())
    }

    /// Wraps the error with the operation that produced it.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
