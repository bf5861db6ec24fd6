//! Reads delimited files into [`Dataset`]s and writes datasets back out.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use crate::{
    data::{display_cell, parse_cell},
    dataset::{self, Column, Dataset, Row},
    io_utils,
    profile::{self, ProfileOptions},
};

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub encoding: Option<String>,
    /// Column file to take names and types from instead of profiling.
    pub columns_path: Option<PathBuf>,
    pub profile: ProfileOptions,
}

fn dataset_name(path: &Path) -> String {
    if io_utils::is_dash(path) {
        return "stdin".to_string();
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn read_records(path: &Path, options: &LoadOptions) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let delimiter = io_utils::resolve_delimiter(path, options.delimiter);
    let encoding = io_utils::resolve_encoding(options.encoding.as_deref())?;
    debug!(
        "Reading {path:?} with delimiter '{}' and encoding {}",
        io_utils::printable_delimiter(delimiter),
        encoding.name()
    );
    let mut reader = io_utils::open_csv_reader(path, delimiter)?;
    let header_record = reader
        .byte_headers()
        .with_context(|| format!("Reading headers from {path:?}"))?
        .clone();
    let headers: Vec<String> = io_utils::decode_record(&header_record, encoding)?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} of {path:?}", row_idx + 2))?;
        let mut decoded = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {} of {path:?}", row_idx + 2))?;
        decoded.resize(headers.len(), String::new());
        records.push(decoded);
    }
    Ok((headers, records))
}

fn resolve_columns(
    headers: &[String],
    records: &[Vec<String>],
    options: &LoadOptions,
) -> Result<Vec<Column>> {
    let Some(columns_path) = &options.columns_path else {
        return Ok(profile::profile_columns(headers, records, &options.profile));
    };
    let declared = dataset::load_columns(columns_path)
        .with_context(|| format!("Loading columns from {columns_path:?}"))?;
    if declared.len() != headers.len()
        || declared.iter().zip(headers).any(|(c, h)| &c.name != h)
    {
        return Err(anyhow!(
            "Column file {columns_path:?} does not match headers {headers:?}"
        ));
    }
    Ok(options.profile.overrides.apply(&declared))
}

/// Loads a delimited file, profiling its columns unless a column file is given.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let (headers, records) = read_records(path, options)?;
    let columns = resolve_columns(&headers, &records, options)?;
    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .zip(record)
                .map(|(column, raw)| (column.name.clone(), parse_cell(raw, column.column_type)))
                .collect()
        })
        .collect();
    let dataset = Dataset::new(dataset_name(path), columns, rows)
        .with_context(|| format!("Building dataset from {path:?}"))?;
    info!(
        "Loaded '{}' with {} column(s) and {} row(s)",
        dataset.name,
        dataset.columns.len(),
        dataset.row_count()
    );
    Ok(dataset)
}

/// Writes `dataset` as CSV to `path`, or stdout when `path` is `None` or `-`.
pub fn write_dataset(dataset: &Dataset, path: Option<&Path>, delimiter: Option<u8>) -> Result<()> {
    let delimiter = path
        .map(|p| io_utils::resolve_delimiter(p, delimiter))
        .or(delimiter)
        .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let mut writer = io_utils::open_csv_writer(path, delimiter)?;
    writer
        .write_record(dataset.headers())
        .context("Writing headers")?;
    for row in &dataset.rows {
        let record = dataset
            .columns
            .iter()
            .map(|c| display_cell(row.get(&c.name).and_then(Option::as_ref)));
        writer.write_record(record).context("Writing row")?;
    }
    writer.flush().context("Flushing output")?;
    Ok(())
}
