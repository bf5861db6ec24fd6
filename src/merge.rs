//! Keyed joins and appends between two in-memory datasets.
//!
//! Keyed joins index the right dataset by a normalized key (trimmed,
//! lowercased display text; nulls match nulls) and then walk the left rows in
//! order. Right and full joins finish by emitting right rows whose key never
//! matched. Appends ignore keys and stack both row sets under the union of
//! their columns.
//!
//! The result is always a fresh column list and row list; neither input is
//! modified.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    data::Value,
    dataset::{Column, Dataset, DatasetError, Row},
};

pub const DEFAULT_RIGHT_SUFFIX: &str = "_right";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Append,
}

impl JoinType {
    fn keeps_unmatched_left(&self) -> bool {
        matches!(self, JoinType::Left | JoinType::Full)
    }

    fn keeps_unmatched_right(&self) -> bool {
        matches!(self, JoinType::Right | JoinType::Full)
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
            JoinType::Full => "full",
            JoinType::Append => "append",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub left_key: String,
    pub right_key: String,
    pub join_type: JoinType,
}

impl JoinSpec {
    pub fn new(
        left_key: impl Into<String>,
        right_key: impl Into<String>,
        join_type: JoinType,
    ) -> Self {
        Self {
            left_key: left_key.into(),
            right_key: right_key.into(),
            join_type,
        }
    }

    pub fn append() -> Self {
        Self::new("", "", JoinType::Append)
    }
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Appended to right-side column names that collide with an existing name.
    pub right_suffix: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            right_suffix: DEFAULT_RIGHT_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("Join key '{key}' not found in {side} dataset columns")]
    InvalidJoinKey { side: Side, key: String },
    #[error("Right column suffix must not be empty")]
    EmptySuffix,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub matched_left_rows: usize,
    pub unmatched_left_rows: usize,
    pub unmatched_right_rows: usize,
    pub output_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub stats: MergeStats,
}

impl MergeResult {
    /// Wraps the merged rows in a new dataset flagged as merged.
    pub fn into_dataset(self, name: impl Into<String>) -> Result<Dataset, DatasetError> {
        let mut dataset = Dataset::new(name, self.columns, self.rows)?;
        dataset.merged = true;
        Ok(dataset)
    }
}

/// Normalized join key; `None` is the null key and only matches other nulls.
type JoinKey = Option<String>;

pub fn normalize_join_value(value: Option<&Value>) -> JoinKey {
    value.map(|v| v.as_display().trim().to_lowercase())
}

fn key_of(row: &Row, column: &str) -> JoinKey {
    normalize_join_value(row.get(column).and_then(Option::as_ref))
}

/// Right-side column as it appears in the output.
struct RightColumn {
    output: Column,
    source: String,
}

fn plan_right_columns(
    left: &[Column],
    right: &[Column],
    right_key: &str,
    suffix: &str,
) -> Vec<RightColumn> {
    let mut taken: HashSet<String> = left.iter().map(|c| c.name.clone()).collect();
    right
        .iter()
        .filter(|c| c.name != right_key)
        .map(|c| {
            let mut name = c.name.clone();
            while taken.contains(&name) {
                name.push_str(suffix);
            }
            taken.insert(name.clone());
            RightColumn {
                output: Column::new(name, c.column_type),
                source: c.name.clone(),
            }
        })
        .collect()
}

fn build_row(
    left_row: Option<&Row>,
    right_row: Option<&Row>,
    left: &[Column],
    right: &[RightColumn],
) -> Row {
    let mut row = Row::with_capacity(left.len() + right.len());
    for column in left {
        let value = left_row.and_then(|r| r.get(&column.name).cloned().flatten());
        row.insert(column.name.clone(), value);
    }
    for column in right {
        let value = right_row.and_then(|r| r.get(&column.source).cloned().flatten());
        row.insert(column.output.name.clone(), value);
    }
    row
}

fn validate_key(dataset: &Dataset, key: &str, side: Side) -> Result<(), MergeError> {
    if dataset.has_column(key) {
        Ok(())
    } else {
        Err(MergeError::InvalidJoinKey {
            side,
            key: key.to_string(),
        })
    }
}

pub fn merge(
    left: &Dataset,
    right: &Dataset,
    spec: &JoinSpec,
) -> Result<MergeResult, MergeError> {
    merge_with_options(left, right, spec, &MergeOptions::default())
}

pub fn merge_with_options(
    left: &Dataset,
    right: &Dataset,
    spec: &JoinSpec,
    options: &MergeOptions,
) -> Result<MergeResult, MergeError> {
    if spec.join_type == JoinType::Append {
        let result = append(left, right);
        info!(
            "Appended '{}' and '{}': {} output row(s)",
            left.name, right.name, result.stats.output_rows
        );
        return Ok(result);
    }

    validate_key(left, &spec.left_key, Side::Left)?;
    validate_key(right, &spec.right_key, Side::Right)?;
    if options.right_suffix.is_empty() {
        return Err(MergeError::EmptySuffix);
    }

    let mut lookup: HashMap<JoinKey, Vec<&Row>> = HashMap::new();
    for row in &right.rows {
        lookup.entry(key_of(row, &spec.right_key)).or_default().push(row);
    }

    let right_columns = plan_right_columns(
        &left.columns,
        &right.columns,
        &spec.right_key,
        &options.right_suffix,
    );

    let mut rows = Vec::new();
    let mut stats = MergeStats::default();
    let mut used_keys: HashSet<JoinKey> = HashSet::new();

    for left_row in &left.rows {
        let key = key_of(left_row, &spec.left_key);
        match lookup.get(&key) {
            Some(matches) => {
                stats.matched_left_rows += 1;
                for right_row in matches {
                    rows.push(build_row(
                        Some(left_row),
                        Some(*right_row),
                        &left.columns,
                        &right_columns,
                    ));
                }
                used_keys.insert(key);
            }
            None => {
                stats.unmatched_left_rows += 1;
                if spec.join_type.keeps_unmatched_left() {
                    rows.push(build_row(Some(left_row), None, &left.columns, &right_columns));
                }
            }
        }
    }

    if spec.join_type.keeps_unmatched_right() {
        for right_row in &right.rows {
            if used_keys.contains(&key_of(right_row, &spec.right_key)) {
                continue;
            }
            stats.unmatched_right_rows += 1;
            rows.push(build_row(None, Some(right_row), &left.columns, &right_columns));
        }
    }

    stats.output_rows = rows.len();
    info!(
        "{} join of '{}' and '{}' on {} = {}: {} output row(s), {} matched left row(s)",
        spec.join_type,
        left.name,
        right.name,
        spec.left_key,
        spec.right_key,
        stats.output_rows,
        stats.matched_left_rows
    );

    let mut columns = left.columns.clone();
    columns.extend(right_columns.into_iter().map(|c| c.output));
    Ok(MergeResult {
        columns,
        rows,
        stats,
    })
}

fn append(left: &Dataset, right: &Dataset) -> MergeResult {
    let mut columns = left.columns.clone();
    for column in &right.columns {
        if !columns.iter().any(|c| c.name == column.name) {
            columns.push(column.clone());
        }
    }

    let normalize = |row: &Row| -> Row {
        columns
            .iter()
            .map(|c| (c.name.clone(), row.get(&c.name).cloned().flatten()))
            .collect()
    };
    let rows: Vec<Row> = left
        .rows
        .iter()
        .chain(right.rows.iter())
        .map(normalize)
        .collect();

    let stats = MergeStats {
        output_rows: rows.len(),
        ..MergeStats::default()
    };
    MergeResult {
        columns,
        rows,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnType;

    fn dataset(
        name: &str,
        columns: &[(&str, ColumnType)],
        rows: Vec<Vec<(&str, Option<Value>)>>,
    ) -> Dataset {
        let columns = columns.iter().map(|(n, t)| Column::new(*n, *t)).collect();
        let rows = rows
            .into_iter()
            .map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect::<Row>()
            })
            .collect();
        Dataset::new(name, columns, rows).expect("dataset")
    }

    fn text(value: &str) -> Option<Value> {
        Some(Value::from(value))
    }

    #[test]
    fn colliding_right_columns_are_suffixed() {
        let left = dataset(
            "left",
            &[("id", ColumnType::String), ("salary", ColumnType::Number)],
            vec![vec![("id", text("1")), ("salary", Some(Value::from(10i64)))]],
        );
        let right = dataset(
            "right",
            &[
                ("id", ColumnType::String),
                ("salary", ColumnType::Number),
                ("salary_right", ColumnType::Number),
            ],
            vec![vec![
                ("id", text("1")),
                ("salary", Some(Value::from(20i64))),
                ("salary_right", Some(Value::from(30i64))),
            ]],
        );
        let result = merge(&left, &right, &JoinSpec::new("id", "id", JoinType::Inner))
            .expect("merge");
        let names: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "salary", "salary_right", "salary_right_right"]
        );
        let row = &result.rows[0];
        assert_eq!(row["salary"], Some(Value::from(10i64)));
        assert_eq!(row["salary_right"], Some(Value::from(20i64)));
        assert_eq!(row["salary_right_right"], Some(Value::from(30i64)));
    }

    #[test]
    fn custom_suffix_is_used() {
        let left = dataset("l", &[("k", ColumnType::String), ("v", ColumnType::String)], vec![]);
        let right = dataset("r", &[("k", ColumnType::String), ("v", ColumnType::String)], vec![]);
        let options = MergeOptions {
            right_suffix: "_b".to_string(),
        };
        let spec = JoinSpec::new("k", "k", JoinType::Left);
        let result = merge_with_options(&left, &right, &spec, &options).expect("merge");
        assert_eq!(result.columns[2].name, "v_b");
    }

    #[test]
    fn empty_suffix_is_rejected() {
        let left = dataset("l", &[("k", ColumnType::String), ("v", ColumnType::String)], vec![]);
        let right = dataset("r", &[("k", ColumnType::String), ("v", ColumnType::String)], vec![]);
        let options = MergeOptions {
            right_suffix: String::new(),
        };
        let spec = JoinSpec::new("k", "k", JoinType::Inner);
        let err = merge_with_options(&left, &right, &spec, &options).unwrap_err();
        assert_eq!(err, MergeError::EmptySuffix);
    }

    #[test]
    fn missing_keys_are_rejected_for_keyed_joins() {
        let left = dataset("l", &[("id", ColumnType::String)], vec![]);
        let right = dataset("r", &[("code", ColumnType::String)], vec![]);
        let err = merge(&left, &right, &JoinSpec::new("id", "id", JoinType::Inner)).unwrap_err();
        assert_eq!(
            err,
            MergeError::InvalidJoinKey {
                side: Side::Right,
                key: "id".to_string()
            }
        );
        let err = merge(&left, &right, &JoinSpec::new("nope", "code", JoinType::Full)).unwrap_err();
        assert!(matches!(err, MergeError::InvalidJoinKey { side: Side::Left, .. }));
        assert!(merge(&left, &right, &JoinSpec::append()).is_ok());
    }

    #[test]
    fn nulls_match_nulls_and_numbers_match_text() {
        let left = dataset(
            "l",
            &[("id", ColumnType::String), ("tag", ColumnType::String)],
            vec![
                vec![("id", None), ("tag", text("a"))],
                vec![("id", text("7")), ("tag", text("b"))],
            ],
        );
        let right = dataset(
            "r",
            &[("id", ColumnType::Number), ("val", ColumnType::Number)],
            vec![
                vec![("id", None), ("val", Some(Value::from(1i64)))],
                vec![("id", Some(Value::from(7.0))), ("val", Some(Value::from(2i64)))],
            ],
        );
        let result = merge(&left, &right, &JoinSpec::new("id", "id", JoinType::Inner))
            .expect("merge");
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0]["val"], Some(Value::from(1i64)));
        assert_eq!(result.rows[1]["val"], Some(Value::from(2i64)));
    }

    #[test]
    fn right_join_skips_unmatched_left_rows() {
        let left = dataset(
            "l",
            &[("id", ColumnType::String)],
            vec![vec![("id", text("1"))], vec![("id", text("2"))]],
        );
        let right = dataset(
            "r",
            &[("id", ColumnType::String), ("v", ColumnType::String)],
            vec![
                vec![("id", text("2")), ("v", text("x"))],
                vec![("id", text("3")), ("v", text("y"))],
            ],
        );
        let result = merge(&left, &right, &JoinSpec::new("id", "id", JoinType::Right))
            .expect("merge");
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0]["id"], text("2"));
        assert_eq!(result.rows[1]["id"], None);
        assert_eq!(result.rows[1]["v"], text("y"));
        assert_eq!(
            result.stats,
            MergeStats {
                matched_left_rows: 1,
                unmatched_left_rows: 1,
                unmatched_right_rows: 1,
                output_rows: 2
            }
        );
    }

    #[test]
    fn merged_dataset_is_flagged() {
        let left = dataset("l", &[("id", ColumnType::String)], vec![]);
        let right = dataset("r", &[("id", ColumnType::String)], vec![]);
        let merged = merge(&left, &right, &JoinSpec::append())
            .expect("merge")
            .into_dataset("combined")
            .expect("dataset");
        assert!(merged.merged);
        assert_ne!(merged.id, left.id);
    }
}
