// Error taxonomy for the browse/publish pipeline.

use thiserror::Error;

use crate::host::{HostError, Severity};

#[derive(Debug, Error)]
pub enum BrowserError {
    /// The content API answered with a non-success status code.
    #[error("HTTP error! status: {status}")]
    Remote { status: u16 },

    /// The body was not JSON or did not match the expected envelope.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request never produced a response (DNS, refused, transport timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// The host rejected the chat post.
    #[error("chat post rejected: {0}")]
    Publish(#[source] HostError),

    /// The fetch succeeded but returned zero records.
    #[error("no NPCs found")]
    EmptyResult,
}

impl BrowserError {
    /// Notification severity used when this error is surfaced to the user.
    pub fn severity(&self) -> Severity {
        match self {
            BrowserError::EmptyResult => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
