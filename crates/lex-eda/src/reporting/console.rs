//! Human-readable console output.
//!
//! These functions use `println!` intentionally: they are the CLI's
//! user-facing output, separate from `tracing` diagnostics.

use crate::retail::drop_message;
use crate::types::{
    DescriptiveStats, GroupTotal, ListingsReport, MissingValueReport, RetailReport, TableOverview,
};
use crate::utils::format_currency;
use polars::prelude::*;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn banner(title: &str) {
    println!("\n{}", "=".repeat(80));
    println!("{}", title);
    println!("{}", "=".repeat(80));
}

fn section(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(40));
}

pub fn print_overview(overview: &TableOverview) {
    section("DATASET OVERVIEW");
    println!("  Rows: {}", overview.rows);
    println!("  Columns: {}", overview.columns);
    println!();
    println!("  {:<28} {:<14} {:>10}", "Column", "Type", "Non-Null");
    println!("  {}", "-".repeat(54));
    for col in &overview.column_overviews {
        println!(
            "  {:<28} {:<14} {:>10}",
            col.name, col.dtype, col.non_null_count
        );
    }
}

pub fn print_head(df: &DataFrame, rows: usize) {
    section("FIRST ROWS");
    println!("{}", df.head(Some(rows)));
}

pub fn print_missing(title: &str, report: &MissingValueReport) {
    section(title);
    println!("  {:<28} {:>10} {:>10}", "Column", "Missing", "Percent");
    for col in &report.columns {
        println!(
            "  {:<28} {:>10} {:>9.2}%",
            col.name, col.missing_count, col.missing_percentage
        );
    }
    println!("  Total missing: {}", report.total_missing());
}

fn print_stats(stats: &[DescriptiveStats]) {
    section("DESCRIPTIVE STATISTICS");
    println!(
        "  {:<16} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for s in stats {
        println!(
            "  {:<16} {:>8} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            s.column, s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
        );
    }
}

fn print_groups(title: &str, groups: &[GroupTotal], as_currency: bool) {
    section(title);
    if groups.is_empty() {
        println!("  (no data)");
    }
    for g in groups {
        let value = if as_currency {
            format_currency(g.total)
        } else {
            format!("{}", g.total)
        };
        println!("  {:<24} {:>16}", g.key, value);
    }
}

fn optional_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| format!("{:.4}", v))
}

pub fn print_listings_report(report: &ListingsReport) {
    banner("LISTINGS CLEANING REPORT");
    print_overview(&report.overview);
    print_missing("MISSING VALUES (BEFORE)", &report.missing_before);

    section("FILLS APPLIED");
    for fill in &report.fills {
        println!(
            "  '{}' missing values filled with {} ({} rows)",
            fill.column, fill.fill_value, fill.filled_count
        );
    }

    print_missing("MISSING VALUES (AFTER)", &report.missing_after);
    println!("\n{}", "=".repeat(80));
}

pub fn print_retail_report(report: &RetailReport) {
    banner("RETAIL EXPLORATORY DATA ANALYSIS");
    print_overview(&report.overview);

    section("CLEANING");
    println!("  {}", drop_message(report.rows_dropped));
    println!("  Rows: {} -> {}", report.initial_rows, report.cleaned_rows);
    print_missing("FINAL CHECK: MISSING VALUES", &report.missing_after_cleaning);

    print_stats(&report.descriptive_stats);
    println!(
        "\n  Total_Amount skewness: {}",
        optional_stat(report.total_amount_shape.skewness)
    );
    println!(
        "  Total_Amount kurtosis: {}",
        optional_stat(report.total_amount_shape.kurtosis)
    );

    section("SALES BY MONTH");
    for m in &report.monthly_sales {
        let name = MONTH_NAMES
            .get((m.month as usize).wrapping_sub(1))
            .copied()
            .unwrap_or("?");
        println!("  {:>2} {:<4} {:>16}", m.month, name, format_currency(m.total));
    }

    section("MONTHLY TREND");
    for p in &report.monthly_trend {
        println!("  {:<8} {:>16}", p.period, format_currency(p.total));
    }

    print_groups(
        "TOP PRODUCT CATEGORIES BY REVENUE",
        &report.top_categories_by_revenue,
        true,
    );
    print_groups(
        "TOP PRODUCT CATEGORIES BY QUANTITY",
        &report.top_categories_by_quantity,
        false,
    );

    section("PURCHASE VALUE");
    println!(
        "  {}: {}",
        report.purchase_value.basis.label(),
        format_currency(report.purchase_value.value)
    );

    if let Some(gender) = &report.sales_by_gender {
        print_groups("SALES BY GENDER", gender, true);
    }
    if let Some(ages) = &report.sales_by_age_group {
        print_groups("SALES BY AGE GROUP", ages, true);
    }

    let charts = report.charts.rendered();
    if !charts.is_empty() {
        section("CHARTS");
        for path in charts {
            println!("  {}", path.display());
        }
    }

    section("KEY FINDINGS");
    for (i, finding) in report.insights.findings().iter().enumerate() {
        println!("  {}. {}", i + 1, finding);
    }

    section("ACTIONABLE RECOMMENDATIONS");
    for (i, rec) in report.insights.recommendations().iter().enumerate() {
        println!("  {}. {}", i + 1, rec);
    }
    println!("\n{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_stat() {
        assert_eq!(optional_stat(None), "undefined");
        assert_eq!(optional_stat(Some(1.23456)), "1.2346");
    }
}
