//! Group-and-sum aggregations over the cleaned retail table.
//!
//! Groups keep first-encounter order before any sort, and every sort is
//! stable, so equal totals stay in encounter order. Rows with a null group
//! key are left out; null values add nothing to their group.

use super::columns::{
    AGE, AGE_GROUP, CUSTOMER_ID, GENDER, ORDER_MONTH, ORDER_YEAR, PRODUCT_CATEGORY, TOTAL_AMOUNT,
};
use super::statistics::mean;
use crate::config::AgeBins;
use crate::error::Result;
use crate::types::{GroupTotal, MonthTotal, PeriodTotal, PurchaseValue, PurchaseValueBasis};
use crate::utils::{
    numeric_values, optional_column, optional_f64s, optional_strings, require_column,
};
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Sum `values` per key, keeping groups in first-encounter order.
pub fn sum_by_key(keys: &[Option<String>], values: &[Option<f64>]) -> Vec<GroupTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal> = Vec::new();

    for (key, value) in keys.iter().zip(values) {
        let Some(key) = key.as_deref() else {
            continue;
        };
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(GroupTotal {
                key: key.to_string(),
                total: 0.0,
            });
            groups.len() - 1
        });
        groups[slot].total += value.unwrap_or(0.0);
    }

    groups
}

/// Stable descending sort by total.
pub fn sort_descending(groups: &mut [GroupTotal]) {
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
}

fn sum_column_by(df: &DataFrame, key_column: &str, value_column: &str) -> Result<Vec<GroupTotal>> {
    let keys = optional_strings(require_column(df, key_column)?)?;
    let values = optional_f64s(require_column(df, value_column)?)?;
    Ok(sum_by_key(&keys, &values))
}

/// Summed `Total_Amount` per `Order_Month` (1-12), ascending by month.
pub fn monthly_sales(df: &DataFrame) -> Result<Vec<MonthTotal>> {
    let months = optional_f64s(require_column(df, ORDER_MONTH)?)?;
    let totals = optional_f64s(require_column(df, TOTAL_AMOUNT)?)?;

    let mut by_month: BTreeMap<u32, f64> = BTreeMap::new();
    for (month, total) in months.iter().zip(&totals) {
        if let Some(month) = month {
            *by_month.entry(*month as u32).or_insert(0.0) += total.unwrap_or(0.0);
        }
    }

    Ok(by_month
        .into_iter()
        .map(|(month, total)| MonthTotal { month, total })
        .collect())
}

/// Summed `Total_Amount` per calendar period (`YYYY-MM`), ascending in time.
pub fn monthly_trend(df: &DataFrame) -> Result<Vec<PeriodTotal>> {
    let years = optional_f64s(require_column(df, ORDER_YEAR)?)?;
    let months = optional_f64s(require_column(df, ORDER_MONTH)?)?;
    let totals = optional_f64s(require_column(df, TOTAL_AMOUNT)?)?;

    let mut by_period: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for ((year, month), total) in years.iter().zip(&months).zip(&totals) {
        if let (Some(year), Some(month)) = (year, month) {
            *by_period
                .entry((*year as i32, *month as u32))
                .or_insert(0.0) += total.unwrap_or(0.0);
        }
    }

    Ok(by_period
        .into_iter()
        .map(|((year, month), total)| PeriodTotal {
            period: format!("{:04}-{:02}", year, month),
            total,
        })
        .collect())
}

/// Product categories ranked by the summed `value_column`, top `n` kept.
pub fn top_categories(df: &DataFrame, value_column: &str, n: usize) -> Result<Vec<GroupTotal>> {
    let mut groups = sum_column_by(df, PRODUCT_CATEGORY, value_column)?;
    sort_descending(&mut groups);
    groups.truncate(n);
    Ok(groups)
}

/// Average purchase value.
///
/// With a `Customer_ID` column this is the mean of per-customer total spend;
/// without one it is the mean transaction amount. An empty table yields NaN.
pub fn average_purchase_value(df: &DataFrame) -> Result<PurchaseValue> {
    if optional_column(df, CUSTOMER_ID).is_some() {
        let per_customer = sum_column_by(df, CUSTOMER_ID, TOTAL_AMOUNT)?;
        let totals: Vec<f64> = per_customer.iter().map(|g| g.total).collect();
        debug!("Computed spend for {} customers", totals.len());
        return Ok(PurchaseValue {
            basis: PurchaseValueBasis::PerCustomer,
            value: mean(&totals).unwrap_or(f64::NAN),
        });
    }

    let amounts = numeric_values(require_column(df, TOTAL_AMOUNT)?)?;
    Ok(PurchaseValue {
        basis: PurchaseValueBasis::PerTransaction,
        value: mean(&amounts).unwrap_or(f64::NAN),
    })
}

/// Summed `Total_Amount` per gender, descending. `None` without a `Gender` column.
pub fn sales_by_gender(df: &DataFrame) -> Result<Option<Vec<GroupTotal>>> {
    if optional_column(df, GENDER).is_none() {
        return Ok(None);
    }
    let mut groups = sum_column_by(df, GENDER, TOTAL_AMOUNT)?;
    sort_descending(&mut groups);
    Ok(Some(groups))
}

/// Add an `Age_Group` column from `Age`. Ages outside every bracket get a
/// null group. Returns `false` (and changes nothing) without an `Age` column.
pub fn assign_age_groups(df: &mut DataFrame, bins: &AgeBins) -> Result<bool> {
    let Some(age) = optional_column(df, AGE) else {
        return Ok(false);
    };

    let groups: Vec<Option<String>> = optional_f64s(age)?
        .into_iter()
        .map(|a| a.and_then(|a| bins.label_for(a)).map(str::to_string))
        .collect();

    let unbucketed = groups.iter().filter(|g| g.is_none()).count();
    if unbucketed > 0 {
        debug!("{} rows fall outside every age bracket", unbucketed);
    }

    df.with_column(Series::new(AGE_GROUP.into(), groups))?;
    Ok(true)
}

/// Summed `Total_Amount` per `Age_Group`, descending, only for groups that
/// have rows. Ties keep bracket order. `None` without an `Age_Group` column.
pub fn sales_by_age_group(df: &DataFrame, bins: &AgeBins) -> Result<Option<Vec<GroupTotal>>> {
    if optional_column(df, AGE_GROUP).is_none() {
        return Ok(None);
    }
    let mut groups = sum_column_by(df, AGE_GROUP, TOTAL_AMOUNT)?;
    groups.sort_by_key(|g| bins.position(&g.key).unwrap_or(usize::MAX));
    sort_descending(&mut groups);
    Ok(Some(groups))
}
