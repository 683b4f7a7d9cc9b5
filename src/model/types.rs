//! Model errors

use thiserror::Error;

/// Estimation failures
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// Too few observations to estimate the model
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },
    /// Normal equations could not be factorized
    #[error("Singular system while fitting {0}")]
    Singular(&'static str),
    /// Optimizer hit its iteration cap
    #[error("Optimizer did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },
    /// Objective evaluated to NaN or infinity at the starting point
    #[error("Non-finite likelihood at starting values")]
    NonFiniteLikelihood,
    /// Configuration value outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
