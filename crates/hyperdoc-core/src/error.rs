//! Error types
//!
//! Only construction inputs and the transport itself produce errors. A
//! document that cannot be fetched is not an error: it loads in the
//! [`DocumentState::Empty`](crate::DocumentState::Empty) state instead.

use thiserror::Error;

/// Errors raised while constructing or dereferencing a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// URL is not an absolute http(s) URL
    #[error("Invalid document URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Access token was empty
    #[error("Missing access token. Set one with --token, HYPERDOC_TOKEN or `hyperdoc config set access_token <token>`.")]
    MissingToken,

    /// A link without an href was followed
    #[error("Link has no href to follow")]
    MissingHref,

    /// The HTTP client could not be created
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl DocumentError {
    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            DocumentError::InvalidUrl { .. } => {
                Some("Use an absolute URL starting with http:// or https://.")
            }
            DocumentError::MissingToken => {
                Some("Obtain an access token from your authentication provider first.")
            }
            DocumentError::MissingHref => {
                Some("Pick a link that has an href; check the relation with `hyperdoc links <rel>`.")
            }
            DocumentError::Transport(_) => None,
        }
    }
}

/// Errors from the HTTP transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request could not be sent or the response could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
