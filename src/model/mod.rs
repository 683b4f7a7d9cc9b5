//! Forecasting models
//!
//! An additive trend/seasonality model for price levels and a GARCH(1,1)
//! model for return volatility. Both follow the same contract: `fit` on a
//! training slice returns a fitted model that can `forecast` a horizon.

mod additive;
mod garch;
mod optimize;
mod types;

pub use additive::{AdditiveModel, FittedAdditive, Forecast, ForecastPoint};
pub use garch::{Garch11, GarchFit, ParameterEstimate, VolatilityForecast};
pub use optimize::{Minimum, NelderMead};
pub use types::ModelError;

/// Trait for models estimated from a training slice
pub trait Estimator {
    /// Training data
    type Input: ?Sized;
    /// Fitted model
    type Fitted;

    /// Estimate model parameters from `data`
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, ModelError>;
}
