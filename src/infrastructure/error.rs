//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Infrastructure errors wrap application errors and add registry transport concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("registry request failed: {message}")]
    Http { message: String },

    #[error("registry returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("registry response unreadable: {message}")]
    Parse { message: String },
}

impl From<reqwest::Error> for InfraError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            InfraError::Parse {
                message: e.to_string(),
            }
        } else {
            InfraError::Http {
                message: e.to_string(),
            }
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
