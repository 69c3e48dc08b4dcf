//! Error types for the scanner

use std::fmt::Write;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("RPC error: {0}")]
    Rpc(#[from] Box<solana_client::client_error::ClientError>),

    #[error("Invalid signature {signature}: {reason}")]
    InvalidSignature { signature: String, reason: String },

    #[error("Invalid program id for {name}: {address}")]
    InvalidProgramId { name: String, address: String },

    #[error("Program already registered: {0}")]
    DuplicateProgram(String),

    #[error("Program registry is empty")]
    EmptyRegistry,

    #[error("Failed to decode transaction {signature}: {reason}")]
    Decode { signature: String, reason: String },

    #[error("Metrics exporter error: {0}")]
    Metrics(String),
}

impl From<solana_client::client_error::ClientError> for Error {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        Error::Rpc(Box::new(err))
    }
}

/// Renders an error followed by its source chain, one `caused by:` line per
/// level. This is the text written to the log when a sweep fails.
///
/// A cause whose message is already the tail of the report (wrappers that
/// format their source into their own message) is not repeated.
pub fn error_report(err: &(dyn std::error::Error + 'static)) -> String {
    let mut report = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !report.ends_with(&message) {
            let _ = write!(report, "\ncaused by: {message}");
        }
        source = cause.source();
    }
    report
}
