//! Retail table normalization and cleaning.

use super::columns::{DATE, ORDER_MONTH, ORDER_YEAR, TOTAL_AMOUNT};
use crate::error::{EdaError, Result};
use crate::utils::{is_datetime_dtype, is_numeric_dtype, optional_strings, require_column};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d.%m.%Y", "%Y%m%d",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Replace spaces in column names with underscores. Returns how many columns
/// were renamed.
pub fn normalize_column_names(df: &mut DataFrame) -> Result<usize> {
    let renames: Vec<(String, String)> = df
        .get_column_names()
        .iter()
        .filter(|name| name.contains(' '))
        .map(|name| (name.to_string(), name.replace(' ', "_")))
        .collect();

    for (old, new) in &renames {
        df.rename(old, new.as_str().into())?;
        debug!("Renamed column '{}' -> '{}'", old, new);
    }

    Ok(renames.len())
}

/// Parse a calendar date from common textual layouts. Time components are
/// discarded. Returns `None` for anything unparsable.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Convert a date to polars' physical Date representation.
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Convert the `Date` column to a polars Date column in place.
///
/// Values that cannot be parsed become null; this never fails on bad values.
/// Returns how many non-null values were coerced to null.
pub fn parse_date_column(df: &mut DataFrame) -> Result<usize> {
    let series = require_column(df, DATE)?;
    let non_null_before = series.len() - series.null_count();

    let parsed = if is_datetime_dtype(series.dtype()) {
        series.cast(&DataType::Date)?
    } else {
        let days: Vec<Option<i32>> = optional_strings(series)?
            .iter()
            .map(|v| v.as_deref().and_then(parse_date).map(days_since_epoch))
            .collect();
        Series::new(DATE.into(), days).cast(&DataType::Date)?
    };

    let coerced = non_null_before - (parsed.len() - parsed.null_count());
    df.replace(DATE, parsed)?;

    if coerced > 0 {
        warn!("{} '{}' values could not be parsed and were set to null", coerced, DATE);
    }
    info!("'{}' column converted to date format", DATE);
    Ok(coerced)
}

/// Cast a numeric column to Float64 in place. Unparsable values become null.
///
/// Returns how many non-null values were coerced to null.
pub fn coerce_numeric_column(df: &mut DataFrame, name: &str) -> Result<usize> {
    let series = require_column(df, name)?;
    if series.dtype() == &DataType::Float64 {
        return Ok(0);
    }
    if !is_numeric_dtype(series.dtype()) {
        debug!("Column '{}' is {}; casting to Float64", name, series.dtype());
    }

    let non_null_before = series.len() - series.null_count();
    let cast = series
        .cast(&DataType::Float64)
        .map_err(|e| EdaError::TypeConversionFailed {
            column: name.to_string(),
            target_type: "Float64".to_string(),
            reason: e.to_string(),
        })?;
    let coerced = non_null_before - (cast.len() - cast.null_count());
    df.replace(name, cast)?;

    if coerced > 0 {
        warn!("{} '{}' values were not numeric and were set to null", coerced, name);
    }
    Ok(coerced)
}

/// Drop every row missing `Date` or `Total_Amount`.
///
/// Returns the cleaned table and the number of rows dropped.
pub fn drop_missing_critical(df: &DataFrame) -> Result<(DataFrame, usize)> {
    let date = require_column(df, DATE)?;
    let total = require_column(df, TOTAL_AMOUNT)?;

    let mask = &date.is_not_null() & &total.is_not_null();
    let cleaned = df.filter(&mask)?;
    let dropped = df.height() - cleaned.height();

    info!("Dropped {} rows with missing critical values", dropped);
    Ok((cleaned, dropped))
}

/// Row-aligned calendar dates of the `Date` column.
pub fn calendar_dates(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>> {
    let series = require_column(df, DATE)?;
    let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(date_from_epoch_days))
        .collect())
}

/// Add `Order_Year` (Int32) and `Order_Month` (UInt32, 1-12) derived from `Date`.
pub fn derive_calendar_fields(df: &mut DataFrame) -> Result<()> {
    let dates = calendar_dates(df)?;

    let years: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.year())).collect();
    let months: Vec<Option<u32>> = dates.iter().map(|d| d.map(|d| d.month())).collect();

    df.with_column(Series::new(ORDER_YEAR.into(), years))?;
    df.with_column(Series::new(ORDER_MONTH.into(), months))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_df() -> DataFrame {
        df![
            "Transaction ID" => [1i64, 2, 3, 4],
            "Date" => [Some("2023-11-24"), Some("not a date"), None, Some("2023-02-27")],
            "Total Amount" => [Some(150i64), Some(1000), Some(30), None],
        ]
        .unwrap()
    }

    #[test]
    fn test_normalize_column_names() {
        let mut df = raw_df();
        let renamed = normalize_column_names(&mut df).unwrap();

        assert_eq!(renamed, 2);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Transaction_ID", "Date", "Total_Amount"]);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 11, 24);
        assert_eq!(parse_date("2023-11-24"), expected);
        assert_eq!(parse_date("2023/11/24"), expected);
        assert_eq!(parse_date("11/24/2023"), expected);
        assert_eq!(parse_date(" 2023-11-24 "), expected);
        assert_eq!(parse_date("2023-11-24 13:45:00"), expected);
        assert_eq!(parse_date("2023-11-24T08:00:00"), expected);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2023-13-45"), None);
    }

    #[test]
    fn test_epoch_days_round_trip_anchor() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(days_since_epoch(epoch), 0);
        assert_eq!(date_from_epoch_days(0), Some(epoch));
        assert_eq!(
            date_from_epoch_days(days_since_epoch(NaiveDate::from_ymd_opt(2023, 2, 27).unwrap())),
            NaiveDate::from_ymd_opt(2023, 2, 27)
        );
    }

    #[test]
    fn test_parse_date_column_coerces_invalid_to_null() {
        let mut df = raw_df();
        normalize_column_names(&mut df).unwrap();
        let coerced = parse_date_column(&mut df).unwrap();

        assert_eq!(coerced, 1);
        let date = df.column("Date").unwrap();
        assert_eq!(date.dtype(), &DataType::Date);
        assert_eq!(date.null_count(), 2);
    }

    #[test]
    fn test_parse_date_column_missing() {
        let mut df = df!["Total_Amount" => [1.0]].unwrap();
        assert!(matches!(
            parse_date_column(&mut df),
            Err(EdaError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_coerce_numeric_column() {
        let mut df = df!["Total_Amount" => [Some("100"), Some("abc"), None]].unwrap();
        let coerced = coerce_numeric_column(&mut df, "Total_Amount").unwrap();

        assert_eq!(coerced, 1);
        let col = df.column("Total_Amount").unwrap();
        assert_eq!(col.dtype(), &DataType::Float64);
        assert_eq!(col.null_count(), 2);
    }

    #[test]
    fn test_drop_missing_critical() {
        let mut df = raw_df();
        normalize_column_names(&mut df).unwrap();
        parse_date_column(&mut df).unwrap();

        let (cleaned, dropped) = drop_missing_critical(&df).unwrap();

        // Row 2: bad date, row 3: null date, row 4: null amount
        assert_eq!(dropped, 3);
        assert_eq!(cleaned.height(), 1);
        assert_eq!(cleaned.column("Date").unwrap().null_count(), 0);
        assert_eq!(cleaned.column("Total_Amount").unwrap().null_count(), 0);
    }

    #[test]
    fn test_drop_missing_critical_requires_total_amount() {
        let df = df!["Date" => [Some("2023-01-01")]].unwrap();
        assert!(matches!(
            drop_missing_critical(&df),
            Err(EdaError::ColumnNotFound(c)) if c == "Total_Amount"
        ));
    }

    #[test]
    fn test_derive_calendar_fields() {
        let mut df = df![
            "Date" => [Some("2023-11-24"), Some("2024-01-03")],
        ]
        .unwrap();
        parse_date_column(&mut df).unwrap();
        derive_calendar_fields(&mut df).unwrap();

        let years: Vec<Option<i32>> = df
            .column("Order_Year")
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        let months: Vec<Option<u32>> = df
            .column("Order_Month")
            .unwrap()
            .u32()
            .unwrap()
            .into_iter()
            .collect();

        assert_eq!(years, vec![Some(2023), Some(2024)]);
        assert_eq!(months, vec![Some(11), Some(1)]);
    }
}
