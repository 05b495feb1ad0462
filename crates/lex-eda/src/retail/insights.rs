//! Headline insights, findings and recommendations.

use crate::types::{GroupTotal, Insights, PeriodTotal};
use crate::utils::format_currency;

/// Placeholder used when a ranked list is empty or a breakdown is unavailable.
pub const NOT_AVAILABLE: &str = "N/A";

/// Period with the highest summed sales. The earliest period wins ties.
pub fn peak_period(trend: &[PeriodTotal]) -> Option<&PeriodTotal> {
    trend
        .iter()
        .fold(None, |best: Option<&PeriodTotal>, p| match best {
            Some(b) if b.total >= p.total => Some(b),
            _ => Some(p),
        })
}

fn first_key(groups: Option<&[GroupTotal]>) -> String {
    groups
        .and_then(|g| g.first())
        .map_or_else(|| NOT_AVAILABLE.to_string(), |g| g.key.clone())
}

impl Insights {
    /// Build insights from the computed aggregates.
    ///
    /// `categories` and `age_groups` must already be sorted descending.
    pub fn from_aggregates(
        average_purchase_value: f64,
        trend: &[PeriodTotal],
        categories: &[GroupTotal],
        age_groups: Option<&[GroupTotal]>,
    ) -> Self {
        Self {
            average_purchase_value,
            peak_sales_month: peak_period(trend)
                .map_or_else(|| NOT_AVAILABLE.to_string(), |p| p.period.clone()),
            top_category: first_key(Some(categories)),
            top_age_group: first_key(age_groups),
        }
    }

    pub fn findings(&self) -> [String; 4] {
        [
            format!(
                "Average Purchase Value (APV): The typical customer or transaction value is {}.",
                format_currency(self.average_purchase_value)
            ),
            format!(
                "Seasonality: Sales show strong seasonality, peaking around {}.",
                self.peak_sales_month
            ),
            format!(
                "Product Performance: The '{}' category is the primary revenue driver.",
                self.top_category
            ),
            format!(
                "Customer Demographics: The '{}' age segment contributes the highest total revenue.",
                self.top_age_group
            ),
        ]
    }

    pub fn recommendations(&self) -> [String; 4] {
        [
            "Inventory and Staffing: Prepare for the peak sales period by increasing stock for \
             high-demand items and boosting sales staff to maximize revenue capture."
                .to_string(),
            format!(
                "Targeted Marketing: Direct most marketing and loyalty spend toward the high-value '{}' segment.",
                self.top_age_group
            ),
            format!(
                "Profitability Deep Dive: Conduct a follow-up analysis to confirm if '{}' leads in profit margin, not just revenue.",
                self.top_category
            ),
            format!(
                "Upselling Strategy: Optimize the store to encourage sales slightly above the APV of {}.",
                format_currency(self.average_purchase_value)
            ),
        ]
    }
}

/// Console line reported after the critical-field drop.
pub fn drop_message(dropped: usize) -> String {
    format!("Dropped {} rows with missing critical values.", dropped)
}
