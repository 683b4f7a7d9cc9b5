//! End-to-end integration tests

use crate::common::{date, linear_with_noise, StaticSource};
use vix_analysis::config::Config;
use vix_analysis::{pipeline, report};

fn config(horizon: usize) -> Config {
    let mut config = Config::default();
    config.data.start_date = date(2023, 1, 2);
    config.data.end_date = Some(date(2024, 12, 31));
    config.forecast.horizon = horizon;
    config
}

#[tokio::test]
async fn test_linear_series_horizon_ten() {
    let source = StaticSource::new(linear_with_noise(date(2023, 1, 2), 200));
    let config = config(10);

    let analysis = pipeline::run(&source, &config).await.unwrap();

    assert_eq!(analysis.prices.len(), 200);
    assert_eq!(analysis.returns.len(), 199);
    assert_eq!(analysis.forecast.future().len(), 10);
    assert_eq!(analysis.forecast.history().len(), 190);

    let rmse = analysis.evaluation.rmse;
    assert!(rmse.is_finite());
    assert!(rmse >= 0.0);
    // Noise amplitude is 0.75; a sane fit stays well inside a few points
    assert!(rmse < 5.0, "rmse {rmse}");

    let volatility = &analysis.volatility;
    assert_eq!(
        volatility.fit.conditional_volatility().len(),
        volatility.training_returns.len()
    );
    assert_eq!(volatility.training_returns.len(), 189);
    assert_eq!(volatility.forecast.len(), 10);
    assert!(volatility.forecast.values().iter().all(|v| *v > 0.0));
}

#[tokio::test]
async fn test_report_writes_console_and_charts() {
    let source = StaticSource::new(linear_with_noise(date(2023, 1, 2), 200));
    let mut config = config(10);
    let dir = tempfile::tempdir().unwrap();
    config.report.output_dir = dir.path().to_path_buf();
    config.report.chart_width = 640;
    config.report.chart_height = 360;

    let analysis = pipeline::run(&source, &config).await.unwrap();

    let mut out = Vec::new();
    let charts = report::present(&mut out, &analysis, &config.report).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("^VIX data preview"));
    assert!(text.contains("descriptive statistics"));
    assert!(text.contains("Additive Trend/Seasonality Model Summary"));
    assert!(text.contains("RMSE:"));
    assert!(text.contains("GARCH(1,1)"));

    let names: Vec<_> = charts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "price.svg",
            "returns.svg",
            "forecast.svg",
            "components.svg",
            "volatility.svg"
        ]
    );
    for chart in &charts {
        let svg = std::fs::read_to_string(chart).unwrap();
        assert!(svg.contains("<svg"), "{} is not SVG", chart.display());
    }
}
