#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};
use vizjoin::{
    data::Value,
    dataset::{Column, ColumnType, Dataset, Row},
};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn columns(spec: &[(&str, ColumnType)]) -> Vec<Column> {
    spec.iter().map(|(name, ty)| Column::new(*name, *ty)).collect()
}

/// Builds a dataset from `(column, value)` pairs per row.
pub fn dataset(
    name: &str,
    spec: &[(&str, ColumnType)],
    rows: Vec<Vec<(&str, Option<Value>)>>,
) -> Dataset {
    let rows = rows
        .into_iter()
        .map(|pairs| {
            pairs
                .into_iter()
                .map(|(column, value)| (column.to_string(), value))
                .collect::<Row>()
        })
        .collect();
    Dataset::new(name, columns(spec), rows).expect("valid dataset")
}

pub fn num(value: f64) -> Option<Value> {
    Some(Value::Number(value))
}

pub fn text(value: &str) -> Option<Value> {
    Some(Value::String(value.to_string()))
}
