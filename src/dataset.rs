//! Tabular data model shared by the profiler, recommender, and merge engine.
//!
//! A [`Dataset`] owns an ordered list of uniquely named [`Column`]s and a list
//! of [`Row`]s. Every row carries an entry for every declared column, with
//! `None` standing in for null cells. Datasets are never edited in place:
//! profiling, merging, and aggregation build new values.
//!
//! Column lists can be persisted to YAML so that user corrections to inferred
//! types survive between invocations.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    str::FromStr,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::data::Value;

pub type Row = HashMap<String, Option<Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
    Date,
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::String => "string",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["number", "string", "date", "boolean"]
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = DatasetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "number" | "numeric" | "integer" | "float" => Ok(ColumnType::Number),
            "string" | "text" | "categorical" => Ok(ColumnType::String),
            "date" | "datetime" => Ok(ColumnType::Date),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            other => Err(DatasetError::UnknownColumnType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("Unknown column type '{0}' (expected one of number, string, date, boolean)")]
    UnknownColumnType(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub merged: bool,
}

impl Dataset {
    /// Builds a dataset, normalizing every row to exactly the declared columns.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<Column>,
        rows: Vec<Row>,
    ) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(column.name.clone()));
            }
        }
        let rows = rows
            .into_iter()
            .map(|mut row| {
                columns
                    .iter()
                    .map(|column| {
                        let value = row.remove(&column.name).flatten();
                        (column.name.clone(), value)
                    })
                    .collect::<Row>()
            })
            .collect();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            columns,
            rows,
            merged: false,
        })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnFile {
    columns: Vec<Column>,
}

pub fn save_columns(path: &Path, columns: &[Column]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating column file {path:?}"))?;
    let document = ColumnFile {
        columns: columns.to_vec(),
    };
    serde_yaml::to_writer(BufWriter::new(file), &document).context("Writing column YAML")
}

pub fn load_columns(path: &Path) -> Result<Vec<Column>> {
    let file = File::open(path).with_context(|| format!("Opening column file {path:?}"))?;
    let document: ColumnFile =
        serde_yaml::from_reader(BufReader::new(file)).context("Parsing column YAML")?;
    Ok(document.columns)
}
