//! Forecast evaluation against held-out actuals

mod analytics;
mod join;

pub use analytics::{evaluate, Evaluation};
pub use join::{inner_join, rmse, MatchedPoint};

use thiserror::Error;

/// Evaluation failures
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    /// No held-out date matched a forecast date
    #[error("No held-out dates matched forecast dates ({held_out} held out, {forecast} forecast)")]
    EmptyJoin { held_out: usize, forecast: usize },
}
