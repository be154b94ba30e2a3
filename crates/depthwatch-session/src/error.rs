//! Session error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Decode error: {0}")]
    Decode(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
