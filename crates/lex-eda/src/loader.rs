//! CSV loading with fallbacks for slightly malformed files.

use crate::error::{EdaError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a CSV file with a header row.
///
/// Tries, in order: standard parsing with double-quote handling, parsing
/// without explicit quote options, reading every column as text, then parsing
/// pre-cleaned content (collapsed doubled quotes, blank lines removed). A
/// missing file fails immediately.
///
/// Text columns are left for the analyses to cast; values that do not parse
/// there become null instead of failing the load.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(EdaError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    info!("Loading dataset from: {}", path.display());

    // Strategy 1: standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    // Strategy 2: without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Loading without quotes failed: {}", e),
    }

    // Strategy 3: every column as text, for values past the inference window
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => {
            info!("Loaded every column as text after typed parsing failed");
            return Ok(df);
        }
        Err(e) => debug!("Loading as text failed: {}", e),
    }

    // Strategy 4: pre-clean content
    let content = std::fs::read_to_string(path)
        .context(format!("Reading {}", path.display()))?;
    load_csv_from_str(&clean_csv_content(&content))
        .context(format!("Parsing {}", path.display()))
}

/// Parse CSV text with a header row.
///
/// Falls back to reading every column as text when typed parsing fails.
pub fn load_csv_from_str(content: &str) -> Result<DataFrame> {
    match read_csv_str(content, Some(INFER_SCHEMA_ROWS)) {
        Ok(df) => Ok(df),
        Err(e) => {
            debug!("Typed parsing failed, reading as text: {}", e);
            Ok(read_csv_str(content, Some(0))?)
        }
    }
}

fn read_csv_str(content: &str, infer_rows: Option<usize>) -> PolarsResult<DataFrame> {
    let cursor = Cursor::new(content.as_bytes().to_vec());
    CsvReadOptions::default()
        .with_infer_schema_length(infer_rows)
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()
}

fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
