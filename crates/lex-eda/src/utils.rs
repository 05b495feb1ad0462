//! Shared utilities for the EDA pipelines.
//!
//! Column capability checks, table summaries and null-filling helpers used by
//! both the listings cleaner and the retail analysis.

use crate::error::{EdaError, Result};
use crate::types::{ColumnMissing, ColumnOverview, MissingValueReport, TableOverview};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

// =============================================================================
// Schema Capability Checks
// =============================================================================

/// Check whether the table has a column with this exact name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Get a required column as a Series, failing with [`EdaError::ColumnNotFound`].
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    if !has_column(df, name) {
        return Err(EdaError::ColumnNotFound(name.to_string()));
    }
    Ok(df.column(name)?.as_materialized_series())
}

/// Get an optional column as a Series, or `None` if the schema lacks it.
pub fn optional_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Series> {
    if !has_column(df, name) {
        return None;
    }
    df.column(name).ok().map(|c| c.as_materialized_series())
}

// =============================================================================
// Table Summaries
// =============================================================================

/// Shape, dtypes and non-null counts per column.
pub fn table_overview(df: &DataFrame) -> TableOverview {
    let column_overviews = df
        .get_columns()
        .iter()
        .map(|col| ColumnOverview {
            name: col.name().to_string(),
            dtype: col.dtype().to_string(),
            non_null_count: col.len() - col.null_count(),
        })
        .collect();

    TableOverview {
        rows: df.height(),
        columns: df.width(),
        column_overviews,
    }
}

/// Null count and percentage for every column, in schema order.
///
/// Percentages are `count / rows * 100`; an empty table reports 0%.
pub fn missing_value_report(df: &DataFrame) -> MissingValueReport {
    let total_rows = df.height();
    let columns = df
        .get_columns()
        .iter()
        .map(|col| {
            let missing_count = col.null_count();
            let missing_percentage = if total_rows == 0 {
                0.0
            } else {
                missing_count as f64 / total_rows as f64 * 100.0
            };
            ColumnMissing {
                name: col.name().to_string(),
                missing_count,
                missing_percentage,
            }
        })
        .collect();

    MissingValueReport {
        total_rows,
        columns,
    }
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Non-null values of a column as f64. Unparsable values are skipped.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().flatten().collect())
}

/// Row-aligned values of a column as optional f64.
pub fn optional_f64s(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Row-aligned values of a column rendered as strings (for use as group keys).
pub fn optional_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a Series with a number. The result is always Float64.
///
/// Fails if any non-null value does not convert to a number, so only the
/// original nulls are ever replaced.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let float_series = series.cast(&DataType::Float64)?;
    let unparsable = float_series.null_count() - series.null_count();
    if unparsable > 0 {
        return Err(PolarsError::ComputeError(
            format!("{} non-null values are not numeric", unparsable).into(),
        ));
    }
    let values: Vec<f64> = float_series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a Series with a literal string. The result is always String.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let str_series = series.cast(&DataType::String)?;
    let values: Vec<String> = str_series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value).to_string())
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

// =============================================================================
// Formatting
// =============================================================================

/// Round to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a number as dollars with thousands separators, e.g. `$1,234.56`.
///
/// NaN and infinities render as `"N/A"`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("${}{}.{}", sign, grouped, frac_part)
}

// =============================================================================
// Tests
// =============================================================================
