//! Chart rendering for the retail analysis.
//!
//! Charts are drawn with [`plotters`] onto the SVG backend, which needs no
//! system fonts and works headless. Each render call writes one file into the
//! renderer's output directory and returns its path, or `None` when there is
//! nothing to draw.

use crate::error::{EdaError, Result, ResultExt};
use crate::retail::statistics::{gaussian_kde, histogram, quantile};
use crate::types::{GroupTotal, PeriodTotal};
use crate::utils::format_currency;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const AMOUNT_DISTRIBUTION_FILE: &str = "amount_distribution.svg";
pub const MONTHLY_TREND_FILE: &str = "monthly_trend.svg";
pub const CATEGORY_REVENUE_FILE: &str = "category_revenue.svg";
pub const AGE_GROUP_REVENUE_FILE: &str = "age_group_revenue.svg";

/// Points sampled along the x axis for the density overlay.
const DENSITY_POINTS: usize = 200;

fn render_error<E: Display>(chart: &str) -> impl Fn(E) -> EdaError {
    let chart = chart.to_string();
    move |e| EdaError::ChartRenderFailed {
        chart: chart.clone(),
        reason: e.to_string(),
    }
}

/// Label for an integer tick position, empty between categories.
fn tick_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Writes SVG charts into a single directory.
pub struct ChartRenderer {
    output_dir: PathBuf,
    size: (u32, u32),
}

impl ChartRenderer {
    /// Create a renderer, creating `output_dir` if needed.
    pub fn new(output_dir: impl Into<PathBuf>, size: (u32, u32)) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)
            .context(format!("Creating chart directory {}", output_dir.display()))?;
        Ok(Self { output_dir, size })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Histogram of transaction amounts with a density overlay.
    ///
    /// Bins span the full data range; the visible x range stops at the
    /// `upper_quantile` of the data, and bars past it are clipped.
    pub fn render_amount_distribution(
        &self,
        amounts: &[f64],
        bins: usize,
        upper_quantile: f64,
    ) -> Result<Option<PathBuf>> {
        let bins = histogram(amounts, bins);
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return Ok(None);
        };

        let view_min = first.start.min(0.0);
        let view_max = quantile(amounts, upper_quantile)
            .filter(|q| *q > view_min)
            .unwrap_or(last.end);
        let bin_width = first.end - first.start;

        let step = (view_max - view_min) / (DENSITY_POINTS - 1) as f64;
        let xs: Vec<f64> = (0..DENSITY_POINTS)
            .map(|i| view_min + step * i as f64)
            .collect();
        // Density scaled to histogram counts
        let scale = amounts.len() as f64 * bin_width;
        let density: Vec<(f64, f64)> = xs
            .iter()
            .zip(gaussian_kde(amounts, &xs))
            .map(|(x, d)| (*x, d * scale))
            .collect();

        let max_count = bins
            .iter()
            .filter(|b| b.start < view_max)
            .map(|b| b.count as f64)
            .fold(0.0, f64::max);
        let max_density = density.iter().map(|(_, y)| *y).fold(0.0, f64::max);
        let y_max = (max_count.max(max_density) * 1.1).max(1.0);

        let path = self.output_dir.join(AMOUNT_DISTRIBUTION_FILE);
        let err = render_error(AMOUNT_DISTRIBUTION_FILE);
        {
            let root = SVGBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(&err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Distribution of Transaction Amounts", ("sans-serif", 28))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(view_min..view_max, 0.0..y_max)
                .map_err(&err)?;

            chart
                .configure_mesh()
                .x_desc("Total Amount")
                .y_desc("Frequency")
                .x_label_formatter(&|x| format_currency(*x))
                .draw()
                .map_err(&err)?;

            chart
                .draw_series(bins.iter().filter(|b| b.start < view_max).map(|b| {
                    Rectangle::new(
                        [(b.start, 0.0), (b.end.min(view_max), b.count as f64)],
                        BLUE.mix(0.6).filled(),
                    )
                }))
                .map_err(&err)?;

            if !density.is_empty() {
                chart
                    .draw_series(LineSeries::new(density, RED.stroke_width(2)))
                    .map_err(&err)?;
            }

            root.present().map_err(&err)?;
        }

        debug!("Wrote {}", path.display());
        Ok(Some(path))
    }

    /// Line chart of summed sales per year-month period.
    pub fn render_monthly_trend(&self, trend: &[PeriodTotal]) -> Result<Option<PathBuf>> {
        if trend.is_empty() {
            return Ok(None);
        }

        let labels: Vec<String> = trend.iter().map(|p| p.period.clone()).collect();
        let points: Vec<(f64, f64)> = trend
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.total))
            .collect();
        let y_max = (points.iter().map(|(_, y)| *y).fold(0.0, f64::max) * 1.1).max(1.0);

        let path = self.output_dir.join(MONTHLY_TREND_FILE);
        let err = render_error(MONTHLY_TREND_FILE);
        {
            let root = SVGBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(&err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Monthly Sales Trend", ("sans-serif", 28))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(90)
                .build_cartesian_2d(-0.5..(labels.len() as f64 - 0.5), 0.0..y_max)
                .map_err(&err)?;

            chart
                .configure_mesh()
                .x_labels(labels.len())
                .x_label_formatter(&|x| tick_label(&labels, *x))
                .y_label_formatter(&|y| format_currency(*y))
                .x_desc("Month")
                .y_desc("Total Sales")
                .draw()
                .map_err(&err)?;

            chart
                .draw_series(LineSeries::new(points.clone(), BLUE.stroke_width(2)))
                .map_err(&err)?;
            chart
                .draw_series(points.iter().map(|p| Circle::new(*p, 4, BLUE.filled())))
                .map_err(&err)?;

            root.present().map_err(&err)?;
        }

        debug!("Wrote {}", path.display());
        Ok(Some(path))
    }

    /// Bar chart of group totals, in the order given.
    pub fn render_bar_chart(
        &self,
        file_name: &str,
        title: &str,
        x_desc: &str,
        groups: &[GroupTotal],
    ) -> Result<Option<PathBuf>> {
        if groups.is_empty() {
            return Ok(None);
        }

        let labels: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
        let y_max = (groups.iter().map(|g| g.total).fold(0.0, f64::max) * 1.1).max(1.0);

        let path = self.output_dir.join(file_name);
        let err = render_error(file_name);
        {
            let root = SVGBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(&err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 28))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(90)
                .build_cartesian_2d(-0.5..(labels.len() as f64 - 0.5), 0.0..y_max)
                .map_err(&err)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(labels.len())
                .x_label_formatter(&|x| tick_label(&labels, *x))
                .y_label_formatter(&|y| format_currency(*y))
                .x_desc(x_desc)
                .y_desc("Total Revenue")
                .draw()
                .map_err(&err)?;

            chart
                .draw_series(groups.iter().enumerate().map(|(i, g)| {
                    let x = i as f64;
                    Rectangle::new([(x - 0.4, 0.0), (x + 0.4, g.total)], GREEN.mix(0.7).filled())
                }))
                .map_err(&err)?;

            root.present().map_err(&err)?;
        }

        debug!("Wrote {}", path.display());
        Ok(Some(path))
    }

    /// Revenue of the top product categories.
    pub fn render_category_revenue(&self, categories: &[GroupTotal]) -> Result<Option<PathBuf>> {
        self.render_bar_chart(
            CATEGORY_REVENUE_FILE,
            "Top Product Categories by Revenue",
            "Product Category",
            categories,
        )
    }

    /// Revenue per age group.
    pub fn render_age_group_revenue(&self, age_groups: &[GroupTotal]) -> Result<Option<PathBuf>> {
        self.render_bar_chart(
            AGE_GROUP_REVENUE_FILE,
            "Revenue by Age Group",
            "Age Group",
            age_groups,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn renderer() -> (TempDir, ChartRenderer) {
        let dir = TempDir::new().unwrap();
        let renderer = ChartRenderer::new(dir.path().join("charts"), (640, 480)).unwrap();
        (dir, renderer)
    }

    fn assert_svg(path: &Path) {
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("<svg"), "{}", path.display());
    }

    #[test]
    fn test_new_creates_directory() {
        let (_dir, renderer) = renderer();
        assert!(renderer.output_dir().is_dir());
    }

    #[test]
    fn test_render_amount_distribution() {
        let (_dir, renderer) = renderer();
        let amounts = [25.0, 30.0, 50.0, 100.0, 150.0, 300.0, 500.0, 1000.0, 2000.0];

        let path = renderer
            .render_amount_distribution(&amounts, 30, 0.99)
            .unwrap()
            .unwrap();
        assert!(path.ends_with(AMOUNT_DISTRIBUTION_FILE));
        assert_svg(&path);
    }

    #[test]
    fn test_render_amount_distribution_constant_and_empty() {
        let (_dir, renderer) = renderer();
        assert!(
            renderer
                .render_amount_distribution(&[50.0, 50.0], 10, 0.99)
                .unwrap()
                .is_some()
        );
        assert!(
            renderer
                .render_amount_distribution(&[], 10, 0.99)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_render_monthly_trend() {
        let (_dir, renderer) = renderer();
        let trend = vec![
            PeriodTotal {
                period: "2023-01".to_string(),
                total: 1200.0,
            },
            PeriodTotal {
                period: "2023-02".to_string(),
                total: 800.0,
            },
        ];

        let path = renderer.render_monthly_trend(&trend).unwrap().unwrap();
        assert_svg(&path);
        assert!(renderer.render_monthly_trend(&[]).unwrap().is_none());
    }

    #[test]
    fn test_render_bar_charts() {
        let (_dir, renderer) = renderer();
        let groups = vec![
            GroupTotal {
                key: "Electronics".to_string(),
                total: 1500.0,
            },
            GroupTotal {
                key: "Beauty".to_string(),
                total: 300.0,
            },
        ];

        let categories = renderer.render_category_revenue(&groups).unwrap().unwrap();
        let ages = renderer.render_age_group_revenue(&groups).unwrap().unwrap();
        assert_svg(&categories);
        assert_svg(&ages);
        assert!(renderer.render_age_group_revenue(&[]).unwrap().is_none());
    }

    #[test]
    fn test_tick_label() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(tick_label(&labels, 1.0), "b");
        assert_eq!(tick_label(&labels, 0.5), "");
        assert_eq!(tick_label(&labels, 2.0), "");
        assert_eq!(tick_label(&labels, -1.0), "");
    }
}
