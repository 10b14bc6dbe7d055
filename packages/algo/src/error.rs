//! Error taxonomy for structurally invalid scoring input.
//!
//! A zero-norm vector is not an error: it is reported through
//! [`Similarity::degenerate`](crate::similarity::Similarity).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgoError {
    #[error("vector length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    #[error("{0} must not be empty")]
    EmptyVector(&'static str),
    #[error("{0} contains non-finite values")]
    NonFinite(&'static str),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: String, value: f64 },
    #[error("unknown knowledge domain: {0}")]
    UnknownDomain(String),
}
