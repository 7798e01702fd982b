//! Transport errors.
//!
//! Every variant is a local failure to obtain a status from the server.
//! The controller treats all of them exactly like an explicit denial.

use thiserror::Error;

/// Errors that can occur during one authorization exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Client is not connected to server
    #[error("Not connected to server")]
    NotConnected,

    /// Connection attempt timed out
    #[error("Connection timeout after {0}ms")]
    ConnectionTimeout(u64),

    /// Read operation timed out
    #[error("Read timeout after {0}ms")]
    ReadTimeout(u64),

    /// Write operation timed out
    #[error("Write timeout after {0}ms")]
    WriteTimeout(u64),

    /// Connection was lost during operation
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Status line missing or not a success
    #[error("Bad status line: {0}")]
    BadStatusLine(String),

    /// Header/body boundary missing or response unreadable
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Body is not a JSON object with an integer `status`
    #[error("Malformed body: {0}")]
    MalformedBody(String),

    /// Request could not be encoded
    #[error("Protocol error: {0}")]
    Protocol(portaria_core::Error),

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Returns `true` if a phase of the exchange ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout(_) | Self::ReadTimeout(_) | Self::WriteTimeout(_)
        )
    }
}

impl From<portaria_core::Error> for TransportError {
    fn from(error: portaria_core::Error) -> Self {
        use portaria_core::Error;

        match error {
            Error::BadStatusLine(line) => Self::BadStatusLine(line),
            Error::MalformedResponse(reason) => Self::MalformedResponse(reason),
            Error::FrameTooLarge { size, max } => Self::MalformedResponse(format!(
                "response of {size} bytes exceeds maximum of {max}"
            )),
            Error::MalformedBody(reason) => Self::MalformedBody(reason),
            Error::Io(e) => Self::Io(e),
            other => Self::Protocol(other),
        }
    }
}
