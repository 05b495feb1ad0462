//! The retail analysis pipeline.
//!
//! Steps run in a fixed order, each on the previous step's output:
//! normalize names, parse dates, drop rows missing critical fields, describe,
//! derive calendar fields, aggregate, render charts, derive insights.

use super::aggregations::{
    assign_age_groups, average_purchase_value, monthly_sales, monthly_trend, sales_by_age_group,
    sales_by_gender, top_categories,
};
use super::cleaning::{
    coerce_numeric_column, derive_calendar_fields, drop_missing_critical, normalize_column_names,
    parse_date_column,
};
use super::columns::{PRICE_PER_UNIT, QUANTITY, TOTAL_AMOUNT};
use super::statistics::{describe_columns, distribution_shape};
use crate::charts::ChartRenderer;
use crate::config::RetailConfig;
use crate::error::{EdaError, Result};
use crate::types::{ChartPaths, GroupTotal, Insights, PeriodTotal, RetailReport};
use crate::utils::{missing_value_report, numeric_values, require_column, table_overview};
use polars::prelude::*;
use std::time::Instant;
use tracing::{error, info, warn};

/// Runs the retail analysis over a loaded transactions table.
///
/// # Example
///
/// ```rust,ignore
/// use lex_eda::{RetailConfig, RetailPipeline};
///
/// let (cleaned, report) = RetailPipeline::builder()
///     .config(RetailConfig::builder().render_charts(false).build()?)
///     .build()?
///     .run(df)?;
///
/// println!("Dropped {} rows", report.rows_dropped);
/// ```
#[derive(Debug, Clone)]
pub struct RetailPipeline {
    config: RetailConfig,
}

impl RetailPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> RetailPipelineBuilder {
        RetailPipelineBuilder::default()
    }

    /// Run every step and return the cleaned table with the full report.
    pub fn run(&self, df: DataFrame) -> Result<(DataFrame, RetailReport)> {
        self.run_internal(df).inspect_err(|e| error!("Retail analysis failed: {}", e))
    }

    fn run_internal(&self, mut df: DataFrame) -> Result<(DataFrame, RetailReport)> {
        let start_time = Instant::now();
        let initial_rows = df.height();
        info!("Starting retail analysis on {} rows", initial_rows);

        // Step 1: Normalize names
        let renamed = normalize_column_names(&mut df)?;
        info!("Step 1: Normalized {} column names", renamed);
        let overview = table_overview(&df);

        // Step 2: Parse dates and numeric fields
        info!("Step 2: Parsing dates and numeric fields...");
        parse_date_column(&mut df)?;
        for column in [TOTAL_AMOUNT, QUANTITY, PRICE_PER_UNIT] {
            coerce_numeric_column(&mut df, column)?;
        }

        // Step 3: Drop rows missing critical fields
        let (mut df, rows_dropped) = drop_missing_critical(&df)?;
        let missing_after_cleaning = missing_value_report(&df);
        info!(
            "Step 3: {} rows remain, {} missing values left",
            df.height(),
            missing_after_cleaning.total_missing()
        );

        // Step 4: Descriptive statistics
        info!("Step 4: Computing descriptive statistics...");
        let descriptive_stats = describe_columns(&df, &[QUANTITY, PRICE_PER_UNIT, TOTAL_AMOUNT])?;
        let total_amount_shape = distribution_shape(&df, TOTAL_AMOUNT)?;

        // Step 5: Calendar fields and time aggregation
        info!("Step 5: Aggregating sales over time...");
        derive_calendar_fields(&mut df)?;
        let monthly_sales = monthly_sales(&df)?;
        let monthly_trend = monthly_trend(&df)?;

        // Step 6: Category rankings
        info!("Step 6: Ranking product categories...");
        let top_categories_by_revenue = top_categories(&df, TOTAL_AMOUNT, self.config.top_n)?;
        let top_categories_by_quantity = top_categories(&df, QUANTITY, self.config.top_n)?;

        // Step 7: Purchase value
        let purchase_value = average_purchase_value(&df)?;
        info!(
            "Step 7: {} = {:.2}",
            purchase_value.basis.label(),
            purchase_value.value
        );

        // Step 8: Demographics
        info!("Step 8: Analyzing demographics...");
        let sales_by_gender = sales_by_gender(&df)?;
        if sales_by_gender.is_none() {
            warn!("No 'Gender' column; skipping sales by gender");
        }
        let sales_by_age_group = if assign_age_groups(&mut df, &self.config.age_bins)? {
            sales_by_age_group(&df, &self.config.age_bins)?
        } else {
            warn!("No 'Age' column; skipping sales by age group");
            None
        };

        // Step 9: Charts
        let charts = if self.config.render_charts {
            info!("Step 9: Rendering charts to {}", self.config.chart_dir.display());
            self.render_charts(
                &df,
                &monthly_trend,
                &top_categories_by_revenue,
                sales_by_age_group.as_deref(),
            )?
        } else {
            info!("Step 9: Skipping chart rendering (disabled)");
            ChartPaths::default()
        };

        // Step 10: Insights
        let insights = Insights::from_aggregates(
            purchase_value.value,
            &monthly_trend,
            &top_categories_by_revenue,
            sales_by_age_group.as_deref(),
        );

        info!(
            "Retail analysis completed in {} ms",
            start_time.elapsed().as_millis()
        );

        let report = RetailReport {
            initial_rows,
            overview,
            rows_dropped,
            cleaned_rows: df.height(),
            missing_after_cleaning,
            descriptive_stats,
            total_amount_shape,
            monthly_sales,
            monthly_trend,
            top_categories_by_revenue,
            top_categories_by_quantity,
            purchase_value,
            sales_by_gender,
            sales_by_age_group,
            charts,
            insights,
        };

        Ok((df, report))
    }

    fn render_charts(
        &self,
        df: &DataFrame,
        trend: &[PeriodTotal],
        categories: &[GroupTotal],
        age_groups: Option<&[GroupTotal]>,
    ) -> Result<ChartPaths> {
        let renderer = ChartRenderer::new(&self.config.chart_dir, self.config.chart_size)?;
        let amounts = numeric_values(require_column(df, TOTAL_AMOUNT)?)?;

        let charts = ChartPaths {
            amount_distribution: renderer.render_amount_distribution(
                &amounts,
                self.config.histogram_bins,
                self.config.histogram_upper_quantile,
            )?,
            monthly_trend: renderer.render_monthly_trend(trend)?,
            category_revenue: renderer.render_category_revenue(categories)?,
            age_group_revenue: match age_groups {
                Some(groups) => renderer.render_age_group_revenue(groups)?,
                None => None,
            },
        };

        info!("Rendered {} charts", charts.rendered().len());
        Ok(charts)
    }
}

/// Builder for [`RetailPipeline`].
#[derive(Debug, Default)]
pub struct RetailPipelineBuilder {
    config: Option<RetailConfig>,
}

impl RetailPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RetailConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<RetailPipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| EdaError::InvalidConfig(e.to_string()))?;
        Ok(RetailPipeline { config })
    }
}
