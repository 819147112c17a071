//! Delimited-text ingestion and export.
//!
//! Tables are read with a required header row. The separator and the number of
//! rows sampled for schema inference come from [`CleanerConfig`].

use crate::config::CleanerConfig;
use crate::error::{CleanerError, Result, ResultExt};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn read_options(config: &CleanerConfig) -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(config.infer_schema_length)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(config.separator)
                .with_quote_char(Some(b'"')),
        )
}

/// Parse delimited-text bytes into a table.
pub fn read_csv_bytes(bytes: &[u8], config: &CleanerConfig) -> Result<DataFrame> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(CleanerError::Ingestion("input is empty".to_string()));
    }

    let df = read_options(config)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| CleanerError::Ingestion(e.to_string()))?;

    debug!("Read table with {} rows and {} columns", df.height(), df.width());
    Ok(df)
}

/// Read a delimited-text file into a table.
pub fn read_csv_file(path: impl AsRef<Path>, config: &CleanerConfig) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CleanerError::Ingestion(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(path).context(format!("Reading {}", path.display()))?;
    if metadata.len() == 0 {
        return Err(CleanerError::Ingestion(format!(
            "file is empty: {}",
            path.display()
        )));
    }

    let df = read_options(config)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .map_err(|e| CleanerError::Ingestion(e.to_string()))?;

    info!(
        "Loaded {} ({} rows, {} columns)",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Serialize a table to delimited text with a header row and no index column.
///
/// A table without rows or without columns exports as zero bytes.
pub fn write_csv_bytes(df: &DataFrame, config: &CleanerConfig) -> Result<Vec<u8>> {
    if df.height() == 0 || df.width() == 0 {
        return Ok(Vec::new());
    }

    let mut buf = Vec::new();
    let mut df = df.clone();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(config.separator)
        .with_quote_char(b'"')
        .finish(&mut df)
        .map_err(|e| CleanerError::Export(e.to_string()))?;

    Ok(buf)
}

/// Write a table to a delimited-text file.
pub fn write_csv_file(df: &DataFrame, path: impl AsRef<Path>, config: &CleanerConfig) -> Result<()> {
    let path = path.as_ref();
    let bytes = write_csv_bytes(df, config)?;
    std::fs::write(path, &bytes).context(format!("Writing {}", path.display()))?;

    info!("Table saved: {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_csv_bytes() {
        let csv = b"age,city\n25,NY\n,NY\n30,LA\n";
        let df = read_csv_bytes(csv, &CleanerConfig::default()).unwrap();

        assert_eq!(df.shape(), (3, 2));
        assert_eq!(df.column("age").unwrap().null_count(), 1);
        assert_eq!(df.column("age").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("city").unwrap().str().unwrap().get(2), Some("LA"));
    }

    #[test]
    fn test_read_csv_bytes_custom_separator() {
        let config = CleanerConfig::builder().separator(b';').build().unwrap();
        let df = read_csv_bytes(b"a;b\n1;x\n2;y\n", &config).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_read_empty_input_is_ingestion_error() {
        let err = read_csv_bytes(b"", &CleanerConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "INGESTION_FAILED");

        let err = read_csv_bytes(b"  \n", &CleanerConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "INGESTION_FAILED");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_csv_file("/definitely/not/here.csv", &CleanerConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "INGESTION_FAILED");
    }

    #[test]
    fn test_write_empty_table_is_empty_bytes() {
        let config = CleanerConfig::default();
        assert!(write_csv_bytes(&DataFrame::empty(), &config).unwrap().is_empty());

        let no_rows = df!["a" => Vec::<i64>::new()].unwrap();
        assert!(write_csv_bytes(&no_rows, &config).unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read_keeps_shape_and_values() {
        let config = CleanerConfig::default();
        let df = df![
            "age" => [Some(25i64), None, Some(30)],
            "city" => ["NY", "New York, NY", "LA"],
        ]
        .unwrap();

        let bytes = write_csv_bytes(&df, &config).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("age,city\n"));

        let back = read_csv_bytes(&bytes, &config).unwrap();
        assert_eq!(back.shape(), (3, 2));
        assert!(back.equals_missing(&df));
    }
}
