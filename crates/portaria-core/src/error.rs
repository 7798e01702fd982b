use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Data model errors
    #[error("Invalid tag id: {0}")]
    InvalidTagId(String),

    #[error("Invalid site id: {0}")]
    InvalidSiteId(String),

    #[error("Visitor authorization requires at least one visitor tag")]
    EmptyVisitorBatch,

    // Protocol errors
    #[error("Bad status line: {0}")]
    BadStatusLine(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Malformed body: {0}")]
    MalformedBody(String),

    #[error("Frame too large: {size} bytes exceeds maximum of {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Failed to encode request: {0}")]
    Encode(String),

    // Controller errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
