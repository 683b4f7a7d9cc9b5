//! Price and return series
//!
//! Immutable date-indexed series; every transformation returns a new one.

mod describe;
mod price;
mod returns;
mod split;
mod types;

pub use describe::Summary;
pub use price::{Observation, PriceSeries};
pub use returns::ReturnSeries;
pub use split::{split_held_out, SeriesSplit};
pub use types::SeriesError;
