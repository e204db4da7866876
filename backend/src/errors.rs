//! Error types shared by the ingestion, regeneration and comparison pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DaccoError>;

#[derive(Error, Debug)]
pub enum DaccoError {
    /// Malformed source XML. Aborts ingestion of the named file.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Missing directory, unreadable file or unwritable destination.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error while {context}: {source}")]
    Database {
        context: String,
        #[source]
        source: diesel::result::Error,
    },

    #[error("Failed to connect to database {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: diesel::ConnectionError,
    },

    #[error("Failed to run database migrations: {0}")]
    Migration(String),

    /// The external canonicalization process is missing or exited with an error.
    #[error("Canonicalization with '{tool}' failed for {}: {message}", path.display())]
    CanonicalizationTool {
        tool: String,
        path: PathBuf,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DaccoError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DaccoError::Io { path: path.into(), source }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DaccoError::Parse { path: path.into(), message: message.into() }
    }

    pub fn database(context: impl Into<String>, source: diesel::result::Error) -> Self {
        DaccoError::Database { context: context.into(), source }
    }
}
