use thiserror::Error;

/// Errors returned by construction and topology mutation.
///
/// The sample path never returns an error: every division, logarithm and
/// square root on that path defensively clamps instead of propagating NaN.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReceptError {
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("numeric edge case: {0}")]
    NumericEdge(&'static str),
}

pub type ReceptResult<T> = Result<T, ReceptError>;
