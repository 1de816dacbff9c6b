use thiserror::Error;

/// Main error type for loregraph
#[derive(Error, Debug)]
pub enum LoregraphError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity not found (unknown id for the requested kind)
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Parse errors (malformed stored fields, bad patterns)
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenient Result type using LoregraphError
pub type Result<T> = std::result::Result<T, LoregraphError>;
