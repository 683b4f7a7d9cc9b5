//! SVG charts

use super::ReportError;
use crate::config::ReportConfig;
use crate::pipeline::Analysis;
use crate::series::{Observation, PriceSeries, ReturnSeries};
use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Pixel dimensions of every chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl From<&ReportConfig> for ChartSize {
    fn from(config: &ReportConfig) -> Self {
        Self {
            width: config.chart_width,
            height: config.chart_height,
        }
    }
}

impl ChartSize {
    fn dims(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

const CAPTION_FONT: (&str, u32) = ("sans-serif", 24);
const PANEL_FONT: (&str, u32) = ("sans-serif", 18);

struct Line<'a> {
    label: &'a str,
    points: Vec<(NaiveDate, f64)>,
    color: RGBColor,
}

macro_rules! try_draw {
    ($chart:expr, $e:expr) => {
        $e.map_err(|e| ReportError::Render {
            chart: $chart.to_string(),
            message: e.to_string(),
        })?
    };
}

fn ensure_dir(dir: &Path) -> Result<(), ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn pairs(observations: &[Observation]) -> Vec<(NaiveDate, f64)> {
    observations.iter().map(|o| (o.date, o.value)).collect()
}

fn date_range<'a>(dates: impl IntoIterator<Item = &'a NaiveDate>) -> Range<NaiveDate> {
    let mut dates = dates.into_iter();
    let Some(first) = dates.next().copied() else {
        return NaiveDate::MIN..NaiveDate::MIN + Days::new(1);
    };
    let (lo, hi) = dates.fold((first, first), |(lo, hi), d| (lo.min(*d), hi.max(*d)));
    if lo == hi {
        lo..hi + Days::new(1)
    } else {
        lo..hi
    }
}

/// Finite min..max with 5% padding
fn value_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return -1.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

/// One or more dated lines on shared axes
fn line_chart(
    path: &Path,
    size: ChartSize,
    title: &str,
    y_desc: &str,
    lines: &[Line<'_>],
) -> Result<(), ReportError> {
    let name = title;
    let root = SVGBackend::new(path, size.dims()).into_drawing_area();
    try_draw!(name, root.fill(&WHITE));

    let x = date_range(lines.iter().flat_map(|l| l.points.iter().map(|(d, _)| d)));
    let y = value_range(lines.iter().flat_map(|l| l.points.iter().map(|(_, v)| *v)));

    let mut chart = try_draw!(
        name,
        ChartBuilder::on(&root)
            .caption(title, CAPTION_FONT)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x, y)
    );
    try_draw!(
        name,
        chart.configure_mesh().x_desc("Date").y_desc(y_desc).draw()
    );

    for line in lines {
        let color = line.color;
        try_draw!(
            name,
            chart.draw_series(LineSeries::new(line.points.iter().copied(), &color))
        )
        .label(line.label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if lines.len() > 1 {
        try_draw!(
            name,
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
        );
    }

    try_draw!(name, root.present());
    Ok(())
}

/// Price level and percentage change charts
pub fn render_exploration(
    output_dir: &Path,
    size: ChartSize,
    ticker: &str,
    prices: &PriceSeries,
    returns: &ReturnSeries,
) -> Result<Vec<PathBuf>, ReportError> {
    ensure_dir(output_dir)?;

    let price_path = output_dir.join("price.svg");
    line_chart(
        &price_path,
        size,
        &format!("{} closing price", ticker),
        "Close",
        &[Line {
            label: "Close",
            points: pairs(prices.observations()),
            color: BLUE,
        }],
    )?;

    let returns_path = output_dir.join("returns.svg");
    line_chart(
        &returns_path,
        size,
        &format!("{} daily percentage change", ticker),
        "Return",
        &[Line {
            label: "Return",
            points: pairs(returns.observations()),
            color: BLUE,
        }],
    )?;

    tracing::debug!(dir = %output_dir.display(), "Rendered exploration charts");
    Ok(vec![price_path, returns_path])
}

/// Forecast, component and volatility charts
pub fn render_models(
    output_dir: &Path,
    size: ChartSize,
    analysis: &Analysis,
) -> Result<Vec<PathBuf>, ReportError> {
    ensure_dir(output_dir)?;

    let forecast_path = output_dir.join("forecast.svg");
    render_forecast(&forecast_path, size, analysis)?;

    let components_path = output_dir.join("components.svg");
    render_components(&components_path, size, analysis)?;

    let volatility_path = output_dir.join("volatility.svg");
    let volatility = &analysis.volatility;
    line_chart(
        &volatility_path,
        size,
        &format!("{} conditional volatility", analysis.ticker),
        "Volatility",
        &[
            Line {
                label: "In-sample",
                points: pairs(&volatility.fit.conditional_volatility()),
                color: BLUE,
            },
            Line {
                label: "Forecast",
                points: pairs(&volatility.forecast.points),
                color: RED,
            },
        ],
    )?;

    Ok(vec![forecast_path, components_path, volatility_path])
}

fn render_forecast(path: &Path, size: ChartSize, analysis: &Analysis) -> Result<(), ReportError> {
    let name = "forecast";
    let points = &analysis.forecast.points;
    let training = pairs(analysis.split.training.observations());
    let held_out = pairs(&analysis.split.held_out);

    let root = SVGBackend::new(path, size.dims()).into_drawing_area();
    try_draw!(name, root.fill(&WHITE));

    let x = date_range(
        points
            .iter()
            .map(|p| &p.date)
            .chain(training.iter().map(|(d, _)| d))
            .chain(held_out.iter().map(|(d, _)| d)),
    );
    let y = value_range(
        points
            .iter()
            .flat_map(|p| [p.yhat_lower, p.yhat_upper])
            .chain(training.iter().map(|(_, v)| *v))
            .chain(held_out.iter().map(|(_, v)| *v)),
    );

    let mut chart = try_draw!(
        name,
        ChartBuilder::on(&root)
            .caption(
                format!("{} forecast ({} days)", analysis.ticker, analysis.evaluation.horizon),
                CAPTION_FONT,
            )
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x, y)
    );
    try_draw!(
        name,
        chart.configure_mesh().x_desc("Date").y_desc("Close").draw()
    );

    let band: Vec<(NaiveDate, f64)> = points
        .iter()
        .map(|p| (p.date, p.yhat_upper))
        .chain(points.iter().rev().map(|p| (p.date, p.yhat_lower)))
        .collect();
    let band_color = BLUE.mix(0.2);
    try_draw!(
        name,
        chart.draw_series(std::iter::once(Polygon::new(band, band_color.filled())))
    )
    .label("Interval")
    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], band_color.filled()));

    try_draw!(
        name,
        chart.draw_series(LineSeries::new(training.iter().copied(), &BLACK))
    )
    .label("Training")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    try_draw!(
        name,
        chart.draw_series(LineSeries::new(
            points.iter().map(|p| (p.date, p.yhat)),
            &BLUE
        ))
    )
    .label("Forecast")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    try_draw!(
        name,
        chart.draw_series(LineSeries::new(held_out.iter().copied(), &RED))
    )
    .label("Held-out actual")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    try_draw!(
        name,
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
    );
    try_draw!(name, root.present());
    Ok(())
}

fn render_components(path: &Path, size: ChartSize, analysis: &Analysis) -> Result<(), ReportError> {
    let name = "components";
    let model = &analysis.model;
    let panels = 1 + usize::from(model.has_yearly()) + usize::from(model.has_weekly());

    let root = SVGBackend::new(path, (size.width, size.height * panels as u32 / 2 + size.height / 2))
        .into_drawing_area();
    try_draw!(name, root.fill(&WHITE));
    let areas = root.split_evenly((panels, 1));
    let mut areas = areas.iter();

    if let Some(area) = areas.next() {
        let trend: Vec<(NaiveDate, f64)> = analysis
            .forecast
            .points
            .iter()
            .map(|p| (p.date, p.trend))
            .collect();
        let mut chart = try_draw!(
            name,
            ChartBuilder::on(area)
                .caption("trend", PANEL_FONT)
                .margin(10)
                .x_label_area_size(30)
                .y_label_area_size(60)
                .build_cartesian_2d(
                    date_range(trend.iter().map(|(d, _)| d)),
                    value_range(trend.iter().map(|(_, v)| *v)),
                )
        );
        try_draw!(name, chart.configure_mesh().draw());
        try_draw!(name, chart.draw_series(LineSeries::new(trend, &BLUE)));
    }

    if model.has_yearly() {
        if let Some(area) = areas.next() {
            let yearly = model.yearly_profile();
            let mut chart = try_draw!(
                name,
                ChartBuilder::on(area)
                    .caption("yearly", PANEL_FONT)
                    .margin(10)
                    .x_label_area_size(30)
                    .y_label_area_size(60)
                    .build_cartesian_2d(
                        date_range(yearly.iter().map(|(d, _)| d)),
                        value_range(yearly.iter().map(|(_, v)| *v)),
                    )
            );
            try_draw!(
                name,
                chart
                    .configure_mesh()
                    .x_label_formatter(&|d: &NaiveDate| d.format("%b %d").to_string())
                    .draw()
            );
            try_draw!(name, chart.draw_series(LineSeries::new(yearly, &BLUE)));
        }
    }

    if model.has_weekly() {
        if let Some(area) = areas.next() {
            let weekly = model.weekly_profile();
            let mut chart = try_draw!(
                name,
                ChartBuilder::on(area)
                    .caption("weekly", PANEL_FONT)
                    .margin(10)
                    .x_label_area_size(30)
                    .y_label_area_size(60)
                    .build_cartesian_2d(0.0..6.0, value_range(weekly.iter().map(|(_, v)| *v)))
            );
            let labels: Vec<String> = weekly.iter().map(|(day, _)| day.to_string()).collect();
            try_draw!(
                name,
                chart
                    .configure_mesh()
                    .x_labels(7)
                    .x_label_formatter(&|x: &f64| {
                        labels
                            .get(x.round() as usize)
                            .cloned()
                            .unwrap_or_default()
                    })
                    .draw()
            );
            try_draw!(
                name,
                chart.draw_series(LineSeries::new(
                    weekly.iter().enumerate().map(|(i, (_, v))| (i as f64, *v)),
                    &BLUE,
                ))
            );
        }
    }

    try_draw!(name, root.present());
    Ok(())
}
