//! Unified error model for the gate and the invocations client.
//! Denials are not errors: decision functions return plain bools and this
//! enum only carries the failure taxonomy callers can branch on.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// ACL source unreadable or malformed. The store keeps serving the
    /// last-good snapshot when this is returned from a reload.
    #[error("acl config error ({}): {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Transport-level fault (connect, I/O, framing). Invalidates the client.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The backend denied the operation. The connection itself is healthy.
    #[error("remote authorization error: {message}")]
    RemoteAuthorization { message: String },

    /// Any other failure reported by the backend in a well-formed response.
    #[error("remote error ({kind}): {message}")]
    Remote { kind: String, message: String },

    /// Operation attempted on a client whose connection was already torn
    /// down by an earlier transport fault.
    #[error("invocations client invalidated; reconnect required")]
    Invalidated,
}

impl Error {
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Config { path: path.into(), message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport { message: message.into() }
    }

    /// True when the failure means the underlying connection can no longer
    /// be trusted.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Invalidated)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
