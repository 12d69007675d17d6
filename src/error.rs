//! Error types
//!
//! None of these are fatal to the process. Callers decide whether an error
//! becomes a message on screen, a log line, or a startup failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A stored public key could not be parsed
    #[error("malformed public key for user {user}: {reason}")]
    Policy { user: String, reason: String },

    /// The control repository readme template is malformed
    #[error("readme template: {0}")]
    Template(String),

    /// A repository or path vanished between listing and access
    #[error("not found: {0}")]
    NotFound(String),

    /// Rendering failed or exceeded its bounds
    #[error("render degraded: {0}")]
    RenderDegraded(String),

    #[error(transparent)]
    Git(git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        if err.code() == git2::ErrorCode::NotFound {
            Error::NotFound(err.message().to_string())
        } else {
            Error::Git(err)
        }
    }
}

#[cfg(test)]
impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
