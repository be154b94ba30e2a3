//! Core error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Threshold must be non-negative: {0}")]
    NegativeThreshold(rust_decimal::Decimal),
}

pub type CoreResult<T> = Result<T, CoreError>;
