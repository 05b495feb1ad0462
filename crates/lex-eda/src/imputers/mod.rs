//! Imputation module for handling missing values.
//!
//! Nulls are replaced with deterministic, column-specific defaults
//! (see [`crate::config::FillRule`]).

mod constant;

pub use constant::ConstantImputer;
