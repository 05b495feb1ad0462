//! Report output.
//!
//! Reports are printed to the console for people, or serialized to JSON for
//! machines (`--json` on stdout, `--emit-report` to a file).
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_eda::reporting::{ReportEnvelope, ReportGenerator};
//!
//! let envelope = ReportEnvelope::new("retail", &input, None, report);
//! println!("{}", envelope.to_json()?);
//!
//! let generator = ReportGenerator::new("output");
//! generator.write_report_to_file(&envelope, "retail_sales")?;
//! ```

pub mod console;
mod generator;

pub use generator::{ReportEnvelope, ReportGenerator, write_csv};
