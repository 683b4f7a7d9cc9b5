//! Integration tests

mod common;
mod config_test;
mod e2e_test;
mod feed_test;
mod pipeline_test;
