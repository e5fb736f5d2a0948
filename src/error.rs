use thiserror::Error;

pub use color_eyre::eyre::eyre;

use crate::diagnostic::SqlState;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Server Error (status {status}): {message}")]
    ServerError { status: u8, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to establish connection with the host {host}:{port}: {source}")]
    CannotConnect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Already connected.")]
    AlreadyConnected,

    #[error("Connection is not open.")]
    NotConnected,

    #[error("Connection closed by peer after {received} of {expected} bytes")]
    ConnectionClosed { expected: usize, received: usize },

    #[error("Bad config error: {0}")]
    BadConfigError(String),

    #[error("Invalid packet")]
    InvalidPacket,

    #[error("Unexpected end of data")]
    UnexpectedEof,

    #[error("Value of {0} bytes does not fit an int32 length")]
    ValueTooLong(usize),

    #[error("Unsupported wire type: {0}")]
    UnsupportedWireType(u8),

    #[error("Row has no more columns")]
    RowExhausted,

    #[error("Can not retrieve row column.")]
    ColumnRetrieval { row: i32, column: u16 },

    #[error("Query is not prepared.")]
    QueryNotPrepared,

    #[error("Query was not executed.")]
    QueryNotExecuted,

    #[error("Parameter {0} is not bound.")]
    UnboundParameter(u16),

    #[error("Column index {0} is out of range.")]
    ColumnIndexOutOfRange(u16),

    #[error("Conversion to the bound type is not supported: {0}")]
    UnsupportedConversion(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Library bug: {0}")]
    LibraryBug(color_eyre::Report),
}

impl Error {
    /// SQLSTATE reported for this error in a status record.
    pub fn sql_state(&self) -> SqlState {
        match self {
            Error::CannotConnect { .. } => SqlState::S08001CannotConnect,
            Error::AlreadyConnected => SqlState::S08002AlreadyConnected,
            Error::NotConnected => SqlState::S08003NotConnected,
            Error::UnsupportedConversion(_) | Error::NotImplemented(_) => {
                SqlState::SHYC00OptionalFeatureNotImplemented
            }
            Error::ServerError { .. }
            | Error::IoError(_)
            | Error::ConnectionClosed { .. }
            | Error::BadConfigError(_)
            | Error::InvalidPacket
            | Error::UnexpectedEof
            | Error::ValueTooLong(_)
            | Error::UnsupportedWireType(_)
            | Error::RowExhausted
            | Error::ColumnRetrieval { .. }
            | Error::QueryNotPrepared
            | Error::QueryNotExecuted
            | Error::UnboundParameter(_)
            | Error::ColumnIndexOutOfRange(_)
            | Error::LibraryBug(_) => SqlState::SHY000GeneralError,
        }
    }

    /// Text placed into the status record. Server errors carry the server's message verbatim.
    pub fn diagnostic_message(&self) -> String {
        match self {
            Error::ServerError { message, .. } => message.clone(),
            Error::CannotConnect { .. } => "Failed to establish connection with the host.".to_string(),
            Error::BadConfigError(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;
