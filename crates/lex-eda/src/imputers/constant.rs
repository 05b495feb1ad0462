//! Constant-value imputation.
//!
//! Fills nulls with a fixed number or literal string per column.

use crate::config::{FillRule, FillValue};
use crate::error::{EdaError, Result};
use crate::types::FillAction;
use crate::utils::{fill_numeric_nulls, fill_string_nulls, require_column};
use polars::prelude::*;
use tracing::debug;

/// Constant imputation for filling missing values.
pub struct ConstantImputer;

impl ConstantImputer {
    /// Apply a single fill rule in place.
    ///
    /// Numeric rules leave the column as Float64 and text rules as String.
    /// A column the schema lacks is a [`EdaError::ColumnNotFound`] error, and a
    /// numeric rule over a column holding non-numeric text is a
    /// [`EdaError::TypeConversionFailed`] error that leaves the column untouched.
    pub fn apply_rule(df: &mut DataFrame, rule: &FillRule) -> Result<FillAction> {
        let series = require_column(df, &rule.column)?;
        let filled_count = series.null_count();

        let filled = match &rule.value {
            FillValue::Numeric(value) => fill_numeric_nulls(series, *value),
            FillValue::Text(value) => fill_string_nulls(series, value),
        }
        .map_err(|e| EdaError::TypeConversionFailed {
            column: rule.column.clone(),
            target_type: match rule.value {
                FillValue::Numeric(_) => "Float64".to_string(),
                FillValue::Text(_) => "String".to_string(),
            },
            reason: e.to_string(),
        })?;

        df.replace(&rule.column, filled)?;
        debug!(
            "Filled {} nulls in '{}' with {}",
            filled_count, rule.column, rule.value
        );

        Ok(FillAction {
            column: rule.column.clone(),
            fill_value: rule.value.to_string(),
            filled_count,
        })
    }

    /// Apply rules in order, stopping at the first failure.
    pub fn apply_rules(df: &mut DataFrame, rules: &[FillRule]) -> Result<Vec<FillAction>> {
        rules.iter().map(|rule| Self::apply_rule(df, rule)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_numeric_rule() {
        let mut df = df![
            "reviews_per_month" => [Some(1.5), None, Some(0.2), None],
        ]
        .unwrap();

        let action =
            ConstantImputer::apply_rule(&mut df, &FillRule::numeric("reviews_per_month", 0.0))
                .unwrap();

        assert_eq!(action.filled_count, 2);
        let values = df.column("reviews_per_month").unwrap();
        assert_eq!(values.null_count(), 0);
        assert_eq!(values.dtype(), &DataType::Float64);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(values.get(2).unwrap().try_extract::<f64>().unwrap(), 0.2);
    }

    #[test]
    fn test_apply_numeric_rule_all_null_column() {
        // An all-empty CSV column is inferred as String
        let mut df = df![
            "reviews_per_month" => [Option::<&str>::None, None],
        ]
        .unwrap();

        ConstantImputer::apply_rule(&mut df, &FillRule::numeric("reviews_per_month", 0.0))
            .unwrap();

        let values = df.column("reviews_per_month").unwrap();
        assert_eq!(values.dtype(), &DataType::Float64);
        assert_eq!(values.get(0).unwrap().try_extract::<f64>().unwrap(), 0.0);
    }

    #[test]
    fn test_apply_numeric_rule_keeps_non_numeric_text() {
        let mut df = df![
            "reviews_per_month" => [Some("0.5"), Some("n/a"), None],
        ]
        .unwrap();

        let result =
            ConstantImputer::apply_rule(&mut df, &FillRule::numeric("reviews_per_month", 0.0));

        assert!(matches!(
            result,
            Err(EdaError::TypeConversionFailed { ref column, .. }) if column == "reviews_per_month"
        ));
        // The column is left as it was
        let values: Vec<Option<&str>> = df
            .column("reviews_per_month")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some("0.5"), Some("n/a"), None]);
    }

    #[test]
    fn test_apply_text_rule() {
        let mut df = df![
            "host_name" => [Some("Ana"), None, Some("Bo")],
            "price" => [Some(10i64), None, Some(30)],
        ]
        .unwrap();

        let action =
            ConstantImputer::apply_rule(&mut df, &FillRule::text("host_name", "Unknown")).unwrap();

        assert_eq!(action.filled_count, 1);
        assert_eq!(action.fill_value, "'Unknown'");
        let names: Vec<Option<&str>> = df
            .column("host_name")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(names, vec![Some("Ana"), Some("Unknown"), Some("Bo")]);

        // Other columns are untouched
        assert_eq!(df.column("price").unwrap().null_count(), 1);
    }

    #[test]
    fn test_apply_rule_missing_column() {
        let mut df = df!["a" => [1, 2]].unwrap();
        let result = ConstantImputer::apply_rule(&mut df, &FillRule::text("name", "Unknown"));
        assert!(matches!(result, Err(EdaError::ColumnNotFound(_))));
    }

    #[test]
    fn test_apply_rules_in_order() {
        let mut df = df![
            "name" => [Option::<&str>::None, Some("Loft")],
            "last_review" => [Some("2019-05-21"), None],
        ]
        .unwrap();

        let actions = ConstantImputer::apply_rules(
            &mut df,
            &[
                FillRule::text("name", "Unknown"),
                FillRule::text("last_review", "No Review"),
            ],
        )
        .unwrap();

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].column, "name");
        assert_eq!(actions[1].column, "last_review");
        assert_eq!(df.column("last_review").unwrap().null_count(), 0);
    }
}
