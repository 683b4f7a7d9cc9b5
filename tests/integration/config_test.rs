//! Configuration file tests

use std::path::PathBuf;
use vix_analysis::config::{Config, LogFormatConfig};

#[test]
fn test_config_example_matches_defaults() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    let defaults = Config::default();

    assert_eq!(config.data.ticker, defaults.data.ticker);
    assert_eq!(config.data.start_date, defaults.data.start_date);
    assert_eq!(config.data.end_date, None);
    assert_eq!(config.forecast.horizon, defaults.forecast.horizon);
    assert_eq!(
        config.forecast.changepoint_prior_scale,
        defaults.forecast.changepoint_prior_scale
    );
    assert_eq!(config.forecast.interval_width, defaults.forecast.interval_width);
    assert_eq!(config.volatility.scale_factor, defaults.volatility.scale_factor);
    assert_eq!(config.report.output_dir, defaults.report.output_dir);
    assert_eq!(config.telemetry.log_format, LogFormatConfig::Pretty);
}

#[test]
fn test_partial_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(
        &mut file,
        br#"
            [data]
            ticker = "^VXN"
            end_date = "2024-06-28"

            [report]
            output_dir = "/tmp/vxn"
        "#,
    )
    .unwrap();

    let config = Config::load_or_default(Some(file.path())).unwrap();
    assert_eq!(config.data.ticker, "^VXN");
    assert_eq!(config.data.resolved_end_date().to_string(), "2024-06-28");
    assert_eq!(config.report.output_dir, PathBuf::from("/tmp/vxn"));
    assert_eq!(config.forecast.horizon, 90);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load(dir.path().join("absent.toml")).is_err());
}
