//! vix-analysis: forecasting and volatility analysis of a daily price index
//!
//! This library provides the core components for:
//! - Daily closing prices from Yahoo Finance
//! - Validated price and return series with a business-day calendar
//! - An additive trend/seasonality forecaster
//! - GARCH(1,1) conditional volatility estimation
//! - Held-out forecast evaluation
//! - Console and SVG chart reporting

pub mod calendar;
pub mod cli;
pub mod config;
pub mod evaluate;
pub mod feed;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod series;
pub mod telemetry;
