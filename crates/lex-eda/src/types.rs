use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Shared table summaries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub dtype: String,
    pub non_null_count: usize,
}

/// Shape and per-column dtype/non-null counts of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOverview {
    pub rows: usize,
    pub columns: usize,
    pub column_overviews: Vec<ColumnOverview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub name: String,
    pub missing_count: usize,
    pub missing_percentage: f64,
}

/// Missing-value counts and percentages per column, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueReport {
    pub total_rows: usize,
    pub columns: Vec<ColumnMissing>,
}

impl MissingValueReport {
    /// Total number of nulls across all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing_count).sum()
    }

    /// Missing count for a single column, if present.
    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.missing_count)
    }
}

// ============================================================================
// Listings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillAction {
    pub column: String,
    pub fill_value: String,
    pub filled_count: usize,
}

/// Everything the listings cleaner observed and did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsReport {
    pub overview: TableOverview,
    pub missing_before: MissingValueReport,
    pub fills: Vec<FillAction>,
    pub missing_after: MissingValueReport,
}

// ============================================================================
// Retail
// ============================================================================

/// Descriptive statistics for one numeric column, rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Skewness and excess kurtosis (sample-adjusted). `None` when there are too
/// few values for the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionShape {
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

/// A summed value for one group key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

/// Summed sales for a calendar month number (1-12), across years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub month: u32,
    pub total: f64,
}

/// Summed sales for a single year-month period, labeled `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    pub period: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseValueBasis {
    /// Mean of per-customer total spend.
    PerCustomer,
    /// Mean of individual transaction amounts.
    PerTransaction,
}

impl PurchaseValueBasis {
    pub fn label(&self) -> &'static str {
        match self {
            PurchaseValueBasis::PerCustomer => "Average Customer Spend (APV)",
            PurchaseValueBasis::PerTransaction => "Mean Transaction Value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PurchaseValue {
    pub basis: PurchaseValueBasis,
    pub value: f64,
}

/// Headline values the findings and recommendations are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub average_purchase_value: f64,
    pub peak_sales_month: String,
    pub top_category: String,
    pub top_age_group: String,
}

/// Paths of the charts written for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPaths {
    pub amount_distribution: Option<PathBuf>,
    pub monthly_trend: Option<PathBuf>,
    pub category_revenue: Option<PathBuf>,
    pub age_group_revenue: Option<PathBuf>,
}

impl ChartPaths {
    pub fn rendered(&self) -> Vec<&PathBuf> {
        [
            &self.amount_distribution,
            &self.monthly_trend,
            &self.category_revenue,
            &self.age_group_revenue,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Full result of the retail analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetailReport {
    pub initial_rows: usize,
    pub overview: TableOverview,
    pub rows_dropped: usize,
    pub cleaned_rows: usize,
    pub missing_after_cleaning: MissingValueReport,
    pub descriptive_stats: Vec<DescriptiveStats>,
    pub total_amount_shape: DistributionShape,
    pub monthly_sales: Vec<MonthTotal>,
    pub monthly_trend: Vec<PeriodTotal>,
    pub top_categories_by_revenue: Vec<GroupTotal>,
    pub top_categories_by_quantity: Vec<GroupTotal>,
    pub purchase_value: PurchaseValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_by_gender: Option<Vec<GroupTotal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_by_age_group: Option<Vec<GroupTotal>>,
    pub charts: ChartPaths,
    pub insights: Insights,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_value_labels() {
        assert_eq!(
            PurchaseValueBasis::PerCustomer.label(),
            "Average Customer Spend (APV)"
        );
        assert_eq!(
            PurchaseValueBasis::PerTransaction.label(),
            "Mean Transaction Value"
        );
    }

    #[test]
    fn test_missing_report_helpers() {
        let report = MissingValueReport {
            total_rows: 4,
            columns: vec![
                ColumnMissing {
                    name: "a".to_string(),
                    missing_count: 1,
                    missing_percentage: 25.0,
                },
                ColumnMissing {
                    name: "b".to_string(),
                    missing_count: 2,
                    missing_percentage: 50.0,
                },
            ],
        };
        assert_eq!(report.total_missing(), 3);
        assert_eq!(report.missing_in("b"), Some(2));
        assert_eq!(report.missing_in("c"), None);
    }

    #[test]
    fn test_chart_paths_rendered() {
        let charts = ChartPaths {
            monthly_trend: Some(PathBuf::from("trend.svg")),
            ..ChartPaths::default()
        };
        assert_eq!(charts.rendered(), vec![&PathBuf::from("trend.svg")]);
    }
}
