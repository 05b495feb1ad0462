//! Exploratory Data Analysis Library
//!
//! Two fixed, single-pass analyses built on Polars.
//!
//! # Overview
//!
//! - **Listings cleaning**: audit missing values per column, then fill nulls in
//!   a fixed set of columns with constant defaults ([`ListingsCleaner`]).
//! - **Retail EDA**: normalize a transactions table, drop rows missing critical
//!   fields, compute descriptive statistics, aggregate sales by time, category
//!   and demographics, render charts and derive headline insights
//!   ([`RetailPipeline`]).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_eda::{ListingsCleaner, RetailConfig, RetailPipeline, load_csv};
//! use std::path::Path;
//!
//! // Listings
//! let listings = load_csv(Path::new("data/AB_NYC_2019.csv"))?;
//! let (cleaned, report) = ListingsCleaner::default().clean(listings)?;
//! println!("{} nulls left", report.missing_after.total_missing());
//!
//! // Retail
//! let sales = load_csv(Path::new("data/retail_sales_dataset.csv"))?;
//! let config = RetailConfig::builder()
//!     .top_n(5)
//!     .chart_dir("output/charts")
//!     .build()?;
//!
//! let (_, report) = RetailPipeline::builder()
//!     .config(config)
//!     .build()?
//!     .run(sales)?;
//!
//! for finding in report.insights.findings() {
//!     println!("{finding}");
//! }
//! ```
//!
//! # Configuration
//!
//! [`RetailConfig`] controls histogram bins, the histogram view quantile, the
//! top-N cutoff, age brackets and chart output. It can be built fluently or
//! loaded from JSON with [`RetailConfig::from_json_file`]. [`ListingsConfig`]
//! holds the ordered fill rules.

pub mod charts;
pub mod config;
pub mod error;
pub mod imputers;
pub mod listings;
pub mod loader;
pub mod reporting;
pub mod retail;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::ChartRenderer;
pub use config::{
    AgeBins, ConfigValidationError, FillRule, FillValue, ListingsConfig, RetailConfig,
    RetailConfigBuilder,
};
pub use error::{EdaError, Result as EdaResult, ResultExt};
pub use imputers::ConstantImputer;
pub use listings::ListingsCleaner;
pub use loader::{load_csv, load_csv_from_str};
pub use reporting::{ReportEnvelope, ReportGenerator};
pub use retail::{RetailPipeline, RetailPipelineBuilder};
pub use types::{
    ChartPaths, DescriptiveStats, DistributionShape, FillAction, GroupTotal, Insights,
    ListingsReport, MissingValueReport, MonthTotal, PeriodTotal, PurchaseValue,
    PurchaseValueBasis, RetailReport, TableOverview,
};
pub use utils::{format_currency, missing_value_report, table_overview};
