//! Listings cleaner: missing-value audit followed by constant imputation.
//!
//! Only the columns named by the configured fill rules are altered. With the
//! default rules, `reviews_per_month` nulls become `0.0`, `name` and
//! `host_name` nulls become `"Unknown"` and `last_review` nulls become
//! `"No Review"`.

use crate::config::ListingsConfig;
use crate::error::{EdaError, Result};
use crate::imputers::ConstantImputer;
use crate::types::{FillAction, ListingsReport, MissingValueReport};
use crate::utils::{missing_value_report, table_overview};
use polars::prelude::*;
use tracing::info;

#[derive(Default)]
pub struct ListingsCleaner {
    config: ListingsConfig,
}

impl ListingsCleaner {
    /// Create a cleaner with a validated configuration.
    pub fn new(config: ListingsConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| EdaError::InvalidConfig(e.to_string()))?;
        Ok(Self { config })
    }

    /// Null counts and percentages per column.
    pub fn audit_missing(&self, df: &DataFrame) -> MissingValueReport {
        missing_value_report(df)
    }

    /// Apply the fill rules to a copy of the table.
    pub fn impute(&self, df: &DataFrame) -> Result<(DataFrame, Vec<FillAction>)> {
        let mut cleaned = df.clone();
        let actions = ConstantImputer::apply_rules(&mut cleaned, &self.config.fill_rules)?;
        Ok((cleaned, actions))
    }

    /// Run the full audit → impute → re-audit sequence.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, ListingsReport)> {
        let overview = table_overview(&df);
        info!(
            "Auditing listings table: {} rows x {} columns",
            overview.rows, overview.columns
        );

        let missing_before = self.audit_missing(&df);
        info!(
            "Found {} missing values before cleaning",
            missing_before.total_missing()
        );

        let (cleaned, fills) = self.impute(&df)?;
        for action in &fills {
            info!(
                "'{}' missing values filled with {} ({} rows)",
                action.column, action.fill_value, action.filled_count
            );
        }

        let missing_after = self.audit_missing(&cleaned);

        Ok((
            cleaned,
            ListingsReport {
                overview,
                missing_before,
                fills,
                missing_after,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FillRule;

    fn listings_df() -> DataFrame {
        df![
            "id" => [1i64, 2, 3, 4],
            "name" => [Some("Cozy loft"), None, Some("Sunny room"), None],
            "host_name" => [Some("Ana"), Some("Bo"), None, Some("Cy")],
            "last_review" => [Some("2019-05-21"), None, None, Some("2019-07-05")],
            "reviews_per_month" => [Some(0.21), None, None, Some(4.64)],
            "price" => [Some(149i64), Some(225), None, Some(89)],
        ]
        .unwrap()
    }

    #[test]
    fn test_clean_fills_treated_columns() {
        let cleaner = ListingsCleaner::default();
        let (cleaned, report) = cleaner.clean(listings_df()).unwrap();

        for col in ["name", "host_name", "last_review", "reviews_per_month"] {
            assert_eq!(cleaned.column(col).unwrap().null_count(), 0, "{col}");
            assert_eq!(report.missing_after.missing_in(col), Some(0));
        }

        assert_eq!(report.missing_before.missing_in("name"), Some(2));
        assert_eq!(report.missing_before.missing_in("reviews_per_month"), Some(2));
        assert_eq!(report.fills.len(), 4);
    }

    #[test]
    fn test_reviews_per_month_filled_with_numeric_zero() {
        let (cleaned, _) = ListingsCleaner::default().clean(listings_df()).unwrap();
        let reviews = cleaned.column("reviews_per_month").unwrap();

        assert_eq!(reviews.dtype(), &DataType::Float64);
        assert_eq!(reviews.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(reviews.get(3).unwrap().try_extract::<f64>().unwrap(), 4.64);
    }

    #[test]
    fn test_text_placeholders() {
        let (cleaned, _) = ListingsCleaner::default().clean(listings_df()).unwrap();

        let names: Vec<Option<&str>> = cleaned
            .column("name")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(names[1], Some("Unknown"));

        let reviews: Vec<Option<&str>> = cleaned
            .column("last_review")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(reviews[1], Some("No Review"));
        assert_eq!(reviews[0], Some("2019-05-21"));
    }

    #[test]
    fn test_untreated_columns_unchanged() {
        let df = listings_df();
        let (cleaned, report) = ListingsCleaner::default().clean(df.clone()).unwrap();

        assert_eq!(cleaned.height(), df.height());
        assert_eq!(cleaned.column("price").unwrap().null_count(), 1);
        assert_eq!(report.missing_after.missing_in("price"), Some(1));
        assert!(
            cleaned
                .column("id")
                .unwrap()
                .as_materialized_series()
                .equals(df.column("id").unwrap().as_materialized_series())
        );
    }

    #[test]
    fn test_missing_percentages() {
        let report = ListingsCleaner::default().audit_missing(&listings_df());
        let last_review = report
            .columns
            .iter()
            .find(|c| c.name == "last_review")
            .unwrap();
        assert_eq!(last_review.missing_percentage, 50.0);
    }

    #[test]
    fn test_missing_treated_column_is_fatal() {
        let df = df!["name" => [Some("a")]].unwrap();
        let result = ListingsCleaner::default().clean(df);
        assert!(matches!(result, Err(EdaError::ColumnNotFound(_))));
    }

    #[test]
    fn test_custom_rules() {
        let cleaner = ListingsCleaner::new(ListingsConfig {
            fill_rules: vec![FillRule::numeric("price", -1.0)],
        })
        .unwrap();
        let (cleaned, _) = cleaner.clean(listings_df()).unwrap();

        assert_eq!(cleaned.column("price").unwrap().null_count(), 0);
        // Not named by the rules
        assert_eq!(cleaned.column("name").unwrap().null_count(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ListingsCleaner::new(ListingsConfig { fill_rules: vec![] });
        assert!(matches!(result, Err(EdaError::InvalidConfig(_))));
    }
}
