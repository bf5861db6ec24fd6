//! Column type profiling by majority vote over sampled cells.
//!
//! Each cell votes for every type it can be read as. A column takes the first
//! of boolean, number, date that wins a strict majority of its non-empty
//! cells and falls back to string otherwise. Placeholder tokens such as `N/A`
//! do not vote.
//!
//! User corrections are carried by [`TypeOverrides`], an explicit value the
//! caller owns and passes in on every profiling run.

use std::collections::HashMap;

use log::debug;

use crate::{
    data::{is_placeholder_token, looks_like_date, parse_boolean_token, parse_number_token},
    dataset::{Column, ColumnType},
};

pub const DEFAULT_SAMPLE_ROWS: usize = 2000;

#[derive(Debug, Clone)]
pub struct ProfileOptions {
    /// Number of records to inspect; 0 scans everything.
    pub sample_rows: usize,
    pub overrides: TypeOverrides,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
            overrides: TypeOverrides::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeOverrides {
    types: HashMap<String, ColumnType>,
}

impl TypeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.set(column, column_type);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, column_type: ColumnType) {
        self.types.insert(column.into(), column_type);
    }

    pub fn get(&self, column: &str) -> Option<ColumnType> {
        self.types.get(column).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns a copy of `columns` with overridden types applied.
    pub fn apply(&self, columns: &[Column]) -> Vec<Column> {
        columns
            .iter()
            .map(|column| match self.get(&column.name) {
                Some(column_type) => Column::new(column.name.clone(), column_type),
                None => column.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TypeCandidate {
    non_empty: usize,
    boolean_matches: usize,
    number_matches: usize,
    date_matches: usize,
}

impl TypeCandidate {
    fn update(&mut self, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() || is_placeholder_token(trimmed) {
            return;
        }
        self.non_empty += 1;
        if parse_boolean_token(trimmed).is_some() {
            self.boolean_matches += 1;
        }
        if parse_number_token(trimmed).is_some() {
            self.number_matches += 1;
        } else if looks_like_date(trimmed) {
            self.date_matches += 1;
        }
    }

    fn majority(&self, count: usize) -> bool {
        count > 0 && count * 2 > self.non_empty
    }

    fn decide(&self) -> ColumnType {
        if self.majority(self.boolean_matches) {
            ColumnType::Boolean
        } else if self.majority(self.number_matches) {
            ColumnType::Number
        } else if self.majority(self.date_matches) {
            ColumnType::Date
        } else {
            ColumnType::String
        }
    }
}

/// Classifies every header exactly once from the given raw records.
pub fn profile_columns<R>(
    headers: &[String],
    records: &[R],
    options: &ProfileOptions,
) -> Vec<Column>
where
    R: AsRef<[String]>,
{
    let mut candidates = vec![TypeCandidate::default(); headers.len()];
    let limit = if options.sample_rows == 0 {
        records.len()
    } else {
        options.sample_rows.min(records.len())
    };
    for record in &records[..limit] {
        for (idx, value) in record.as_ref().iter().take(headers.len()).enumerate() {
            candidates[idx].update(value);
        }
    }

    headers
        .iter()
        .zip(candidates)
        .map(|(name, candidate)| {
            let inferred = candidate.decide();
            let column_type = options.overrides.get(name).unwrap_or(inferred);
            debug!(
                "Column '{name}': {} sampled value(s), inferred {inferred}, using {column_type}",
                candidate.non_empty
            );
            Column::new(name.clone(), column_type)
        })
        .collect()
}
