//! Retail transactions analysis.
//!
//! [`RetailPipeline`] drives the whole sequence. The submodules expose each
//! step as a plain function over a `DataFrame` so they can be used and tested
//! on their own.

pub mod aggregations;
pub mod cleaning;
pub mod insights;
mod pipeline;
pub mod statistics;

pub use insights::drop_message;
pub use pipeline::{RetailPipeline, RetailPipelineBuilder};

/// Column names after space normalization.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const TOTAL_AMOUNT: &str = "Total_Amount";
    pub const QUANTITY: &str = "Quantity";
    pub const PRICE_PER_UNIT: &str = "Price_per_Unit";
    pub const PRODUCT_CATEGORY: &str = "Product_Category";
    pub const CUSTOMER_ID: &str = "Customer_ID";
    pub const GENDER: &str = "Gender";
    pub const AGE: &str = "Age";

    // Derived
    pub const AGE_GROUP: &str = "Age_Group";
    pub const ORDER_YEAR: &str = "Order_Year";
    pub const ORDER_MONTH: &str = "Order_Month";
}
