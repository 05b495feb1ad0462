//! Configuration types for the EDA pipelines.
//!
//! The listings cleaner is driven by an ordered list of [`FillRule`]s and the
//! retail analysis by a [`RetailConfig`] built with a fluent builder. Both are
//! serde-compatible so they can be loaded from JSON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Value used to replace nulls in a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    /// Column is cast to Float64 and nulls become this number.
    Numeric(f64),
    /// Column is cast to String and nulls become this literal.
    Text(String),
}

impl std::fmt::Display for FillValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillValue::Numeric(v) => write!(f, "{}", v),
            FillValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Imputation rule for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRule {
    pub column: String,
    pub value: FillValue,
}

impl FillRule {
    pub fn numeric(column: impl Into<String>, value: f64) -> Self {
        Self {
            column: column.into(),
            value: FillValue::Numeric(value),
        }
    }

    pub fn text(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: FillValue::Text(value.into()),
        }
    }
}

/// Configuration for the listings cleaner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsConfig {
    /// Rules applied in order. Columns not named here are never altered.
    pub fill_rules: Vec<FillRule>,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            fill_rules: vec![
                FillRule::numeric("reviews_per_month", 0.0),
                FillRule::text("name", "Unknown"),
                FillRule::text("host_name", "Unknown"),
                FillRule::text("last_review", "No Review"),
            ],
        }
    }
}

impl ListingsConfig {
    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.fill_rules.is_empty() {
            return Err(ConfigValidationError::NoFillRules);
        }
        for rule in &self.fill_rules {
            if rule.column.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName);
            }
        }
        Ok(())
    }
}

/// Age bracket definition used to derive `Age_Group`.
///
/// Bins are half-open `[edges[i], edges[i + 1])`. With `inclusive_upper` set,
/// the last bin also accepts a value equal to the final edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBins {
    pub edges: Vec<f64>,
    pub labels: Vec<String>,
    #[serde(default)]
    pub inclusive_upper: bool,
}

impl Default for AgeBins {
    fn default() -> Self {
        Self {
            edges: vec![18.0, 25.0, 35.0, 45.0, 55.0, 65.0, 100.0],
            labels: ["18-24", "25-34", "35-44", "45-54", "55-64", "65+"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            inclusive_upper: false,
        }
    }
}

impl AgeBins {
    /// Return the label of the bin containing `age`, if any.
    pub fn label_for(&self, age: f64) -> Option<&str> {
        if !age.is_finite() {
            return None;
        }
        let last = self.edges.len().checked_sub(1)?;
        for i in 0..last {
            let lower = self.edges[i];
            let upper = self.edges[i + 1];
            let in_upper = age < upper || (self.inclusive_upper && i + 1 == last && age == upper);
            if age >= lower && in_upper {
                return self.labels.get(i).map(String::as_str);
            }
        }
        None
    }

    /// Position of a label in bin order.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.edges.len() < 2 {
            return Err(ConfigValidationError::InvalidAgeBins(
                "at least two edges are required".to_string(),
            ));
        }
        if self.edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigValidationError::InvalidAgeBins(
                "edges must be strictly increasing".to_string(),
            ));
        }
        if self.labels.len() != self.edges.len() - 1 {
            return Err(ConfigValidationError::InvalidAgeBins(format!(
                "expected {} labels for {} edges, got {}",
                self.edges.len() - 1,
                self.edges.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }
}

/// Configuration for the retail analysis.
///
/// Use [`RetailConfig::builder()`] to create a new configuration with a
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_eda::config::RetailConfig;
///
/// let config = RetailConfig::builder()
///     .top_n(3)
///     .render_charts(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetailConfig {
    /// Number of bins in the transaction amount histogram.
    /// Default: 30
    pub histogram_bins: usize,

    /// Quantile of `Total_Amount` used as the histogram's right view limit.
    /// Default: 0.99
    pub histogram_upper_quantile: f64,

    /// Number of product categories kept in the ranked lists.
    /// Default: 5
    pub top_n: usize,

    /// Age brackets for the demographic breakdown.
    pub age_bins: AgeBins,

    /// Whether to render charts at all.
    /// Default: true
    pub render_charts: bool,

    /// Directory the charts are written to.
    /// Default: "output/charts"
    pub chart_dir: PathBuf,

    /// Chart size in pixels (width, height).
    /// Default: (1000, 600)
    pub chart_size: (u32, u32),
}

impl Default for RetailConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 30,
            histogram_upper_quantile: 0.99,
            top_n: 5,
            age_bins: AgeBins::default(),
            render_charts: true,
            chart_dir: PathBuf::from("output/charts"),
            chart_size: (1000, 600),
        }
    }
}

impl RetailConfig {
    /// Create a new configuration builder.
    pub fn builder() -> RetailConfigBuilder {
        RetailConfigBuilder::default()
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> crate::error::Result<Self> {
        use crate::error::ResultExt;

        let content = std::fs::read_to_string(path)
            .context(format!("Reading config file {}", path.display()))?;
        let config: RetailConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| crate::error::EdaError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        if !(self.histogram_upper_quantile > 0.0 && self.histogram_upper_quantile <= 1.0) {
            return Err(ConfigValidationError::InvalidQuantile(
                self.histogram_upper_quantile,
            ));
        }

        if self.top_n == 0 {
            return Err(ConfigValidationError::InvalidTopN(self.top_n));
        }

        if self.chart_size.0 == 0 || self.chart_size.1 == 0 {
            return Err(ConfigValidationError::InvalidChartSize(
                self.chart_size.0,
                self.chart_size.1,
            ));
        }

        self.age_bins.validate()
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid histogram bins: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),

    #[error("Invalid histogram quantile: {0} (must be in (0.0, 1.0])")]
    InvalidQuantile(f64),

    #[error("Invalid top-N: {0} (must be at least 1)")]
    InvalidTopN(usize),

    #[error("Invalid chart size: {0}x{1}")]
    InvalidChartSize(u32, u32),

    #[error("Invalid age bins: {0}")]
    InvalidAgeBins(String),

    #[error("No fill rules configured")]
    NoFillRules,

    #[error("Fill rule has an empty column name")]
    EmptyColumnName,
}

/// Builder for [`RetailConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct RetailConfigBuilder {
    histogram_bins: Option<usize>,
    histogram_upper_quantile: Option<f64>,
    top_n: Option<usize>,
    age_bins: Option<AgeBins>,
    inclusive_age_upper: Option<bool>,
    render_charts: Option<bool>,
    chart_dir: Option<PathBuf>,
    chart_size: Option<(u32, u32)>,
}

impl RetailConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from JSON).
    pub fn from_config(config: RetailConfig) -> Self {
        Self {
            histogram_bins: Some(config.histogram_bins),
            histogram_upper_quantile: Some(config.histogram_upper_quantile),
            top_n: Some(config.top_n),
            inclusive_age_upper: Some(config.age_bins.inclusive_upper),
            age_bins: Some(config.age_bins),
            render_charts: Some(config.render_charts),
            chart_dir: Some(config.chart_dir),
            chart_size: Some(config.chart_size),
        }
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the quantile used to cap the histogram view.
    ///
    /// # Arguments
    /// * `quantile` - Value in (0.0, 1.0] (e.g., 0.99 = 99th percentile)
    pub fn histogram_upper_quantile(mut self, quantile: f64) -> Self {
        self.histogram_upper_quantile = Some(quantile);
        self
    }

    /// Set how many categories the ranked lists keep.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Replace the age brackets.
    pub fn age_bins(mut self, bins: AgeBins) -> Self {
        self.age_bins = Some(bins);
        self
    }

    /// Make the last age bracket accept its upper edge (e.g. age 100 in "65+").
    pub fn inclusive_age_upper(mut self, inclusive: bool) -> Self {
        self.inclusive_age_upper = Some(inclusive);
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Set the chart output directory.
    pub fn chart_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_dir = Some(path.into());
        self
    }

    /// Set the chart size in pixels.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = Some((width, height));
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `RetailConfig` or an error if validation fails.
    pub fn build(self) -> Result<RetailConfig, ConfigValidationError> {
        let defaults = RetailConfig::default();
        let mut age_bins = self.age_bins.unwrap_or(defaults.age_bins);
        if let Some(inclusive) = self.inclusive_age_upper {
            age_bins.inclusive_upper = inclusive;
        }

        let config = RetailConfig {
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            histogram_upper_quantile: self
                .histogram_upper_quantile
                .unwrap_or(defaults.histogram_upper_quantile),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            age_bins,
            render_charts: self.render_charts.unwrap_or(defaults.render_charts),
            chart_dir: self.chart_dir.unwrap_or(defaults.chart_dir),
            chart_size: self.chart_size.unwrap_or(defaults.chart_size),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retail_config() {
        let config = RetailConfig::default();
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.histogram_upper_quantile, 0.99);
        assert_eq!(config.top_n, 5);
        assert!(config.render_charts);
        assert!(!config.age_bins.inclusive_upper);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = RetailConfig::builder()
            .histogram_bins(10)
            .top_n(3)
            .render_charts(false)
            .inclusive_age_upper(true)
            .chart_dir("charts")
            .build()
            .unwrap();

        assert_eq!(config.histogram_bins, 10);
        assert_eq!(config.top_n, 3);
        assert!(!config.render_charts);
        assert!(config.age_bins.inclusive_upper);
        assert_eq!(config.chart_dir, PathBuf::from("charts"));
    }

    #[test]
    fn test_validation_invalid_quantile() {
        let result = RetailConfig::builder().histogram_upper_quantile(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidQuantile(_)
        ));

        let result = RetailConfig::builder().histogram_upper_quantile(0.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_zero_bins_and_top_n() {
        assert!(matches!(
            RetailConfig::builder().histogram_bins(0).build().unwrap_err(),
            ConfigValidationError::InvalidHistogramBins(0)
        ));
        assert!(matches!(
            RetailConfig::builder().top_n(0).build().unwrap_err(),
            ConfigValidationError::InvalidTopN(0)
        ));
    }

    #[test]
    fn test_validation_bad_age_bins() {
        let bins = AgeBins {
            edges: vec![18.0, 30.0, 25.0],
            labels: vec!["a".to_string(), "b".to_string()],
            inclusive_upper: false,
        };
        assert!(matches!(
            RetailConfig::builder().age_bins(bins).build().unwrap_err(),
            ConfigValidationError::InvalidAgeBins(_)
        ));

        let bins = AgeBins {
            edges: vec![18.0, 30.0],
            labels: vec!["a".to_string(), "b".to_string()],
            inclusive_upper: false,
        };
        assert!(RetailConfig::builder().age_bins(bins).build().is_err());
    }

    #[test]
    fn test_age_bin_boundaries() {
        let bins = AgeBins::default();
        assert_eq!(bins.label_for(17.9), None);
        assert_eq!(bins.label_for(18.0), Some("18-24"));
        assert_eq!(bins.label_for(24.0), Some("18-24"));
        assert_eq!(bins.label_for(25.0), Some("25-34"));
        assert_eq!(bins.label_for(64.0), Some("55-64"));
        assert_eq!(bins.label_for(65.0), Some("65+"));
        assert_eq!(bins.label_for(99.5), Some("65+"));
        assert_eq!(bins.label_for(100.0), None);
        assert_eq!(bins.label_for(f64::NAN), None);
    }

    #[test]
    fn test_age_bins_inclusive_upper() {
        let bins = AgeBins {
            inclusive_upper: true,
            ..AgeBins::default()
        };
        assert_eq!(bins.label_for(100.0), Some("65+"));
        assert_eq!(bins.label_for(100.5), None);
        // Inner edges stay half-open
        assert_eq!(bins.label_for(25.0), Some("25-34"));
    }

    #[test]
    fn test_default_listings_rules() {
        let config = ListingsConfig::default();
        assert_eq!(config.fill_rules.len(), 4);
        assert_eq!(
            config.fill_rules[0],
            FillRule::numeric("reviews_per_month", 0.0)
        );
        assert_eq!(config.fill_rules[3], FillRule::text("last_review", "No Review"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_listings_validation() {
        let config = ListingsConfig { fill_rules: vec![] };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigValidationError::NoFillRules
        ));

        let config = ListingsConfig {
            fill_rules: vec![FillRule::text(" ", "x")],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retail_config_from_json() {
        let json = r#"{
            "histogram_bins": 20,
            "histogram_upper_quantile": 0.95,
            "top_n": 3,
            "age_bins": {
                "edges": [0.0, 40.0, 120.0],
                "labels": ["young", "senior"]
            },
            "render_charts": false,
            "chart_dir": "custom_charts",
            "chart_size": [800, 400]
        }"#;

        let config: RetailConfig = serde_json::from_str(json).expect("Should deserialize");
        assert!(config.validate().is_ok());
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.top_n, 3);
        assert_eq!(config.age_bins.label_for(40.0), Some("senior"));
        assert!(!config.age_bins.inclusive_upper);
        assert_eq!(config.chart_size, (800, 400));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RetailConfig = serde_json::from_str(r#"{"top_n": 10}"#).unwrap();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.age_bins, AgeBins::default());
    }

    #[test]
    fn test_builder_from_config_keeps_values() {
        let base = RetailConfig::builder().top_n(2).build().unwrap();
        let config = RetailConfigBuilder::from_config(base)
            .histogram_bins(12)
            .build()
            .unwrap();
        assert_eq!(config.top_n, 2);
        assert_eq!(config.histogram_bins, 12);
    }
}
