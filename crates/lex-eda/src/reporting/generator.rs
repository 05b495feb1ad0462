use crate::error::{EdaError, Result, ResultExt};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// A report plus run metadata, used for both `--json` output and
/// `--emit-report` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnvelope<T> {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Which analysis produced the report ("listings" or "retail")
    pub analysis: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the cleaned dataset, if one was written
    pub output_file: Option<String>,
    pub report: T,
}

impl<T: Serialize> ReportEnvelope<T> {
    pub fn new(analysis: &str, input_file: &Path, output_file: Option<&Path>, report: T) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            analysis: analysis.to_string(),
            input_file: input_file.display().to_string(),
            output_file: output_file.map(|p| p.display().to_string()),
            report,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes report files and cleaned datasets into an output directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write a report as pretty JSON to `<output_dir>/<base_name>_report.json`.
    pub fn write_report_to_file<T: Serialize>(
        &self,
        report: &ReportEnvelope<T>,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("Creating {}", self.output_dir.display()))?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let json = report
            .to_json()
            .map_err(|e| EdaError::ReportGenerationFailed(e.to_string()))?;

        let mut file = File::create(&report_path)
            .context(format!("Creating {}", report_path.display()))?;
        file.write_all(json.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}

/// Write a table as CSV with a header row, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}
