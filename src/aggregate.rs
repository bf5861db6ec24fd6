//! Groups dataset rows by the assigned dimension and folds each measure.
//!
//! The output is one [`AggregatedRow`] per dimension bucket, in the order the
//! buckets first appear, with one value per assigned measure. This is the
//! row payload chart renderers consume alongside a [`crate::chart::ChartType`].

use std::collections::HashMap;

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{dataset::Dataset, recommend::FieldAssignment};

/// Label of the bucket holding rows whose dimension is null or empty. It is kept
/// apart from a real "(blank)" value even though both render the same way.
pub const BLANK_BUCKET: &str = "(blank)";
/// Label of the single bucket produced when no dimension is assigned.
pub const TOTAL_BUCKET: &str = "Total";

/// Bucket identity; `None` is the synthetic blank or total bucket.
type BucketKey = Option<String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, Default)]
struct MeasureAccumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl MeasureAccumulator {
    fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
    }

    fn finish(&self, method: Aggregation) -> Option<f64> {
        match method {
            Aggregation::Count => Some(self.count as f64),
            _ if self.count == 0 => None,
            Aggregation::Sum => Some(self.sum),
            Aggregation::Mean => Some(self.sum / self.count as f64),
            Aggregation::Min => self.min,
            Aggregation::Max => self.max,
        }
    }
}

/// Buckets `dataset` rows by the assignment's dimension and folds every measure.
pub fn aggregate(
    dataset: &Dataset,
    assignment: &FieldAssignment,
    method: Aggregation,
) -> Vec<AggregatedRow> {
    let dimension = assignment.dimension();
    let mut order: Vec<BucketKey> = Vec::new();
    let mut buckets: HashMap<BucketKey, Vec<MeasureAccumulator>> = HashMap::new();

    for row in &dataset.rows {
        let key = dimension.and_then(|column| {
            row.get(column)
                .and_then(Option::as_ref)
                .map(|value| value.as_display())
                .filter(|label| !label.is_empty())
        });
        let accumulators = buckets.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            vec![MeasureAccumulator::default(); assignment.measures.len()]
        });
        for (accumulator, measure) in accumulators.iter_mut().zip(&assignment.measures) {
            if let Some(Some(value)) = row.get(measure)
                && let Some(number) = value.as_number()
            {
                accumulator.add(number);
            }
        }
    }

    debug!(
        "Aggregated {} row(s) of '{}' into {} bucket(s)",
        dataset.row_count(),
        dataset.name,
        order.len()
    );

    order
        .into_iter()
        .map(|key| {
            let values = buckets
                .get(&key)
                .map(|accumulators| accumulators.iter().map(|a| a.finish(method)).collect())
                .unwrap_or_default();
            let name = key.unwrap_or_else(|| {
                let label = if dimension.is_some() { BLANK_BUCKET } else { TOTAL_BUCKET };
                label.to_string()
            });
            AggregatedRow { name, values }
        })
        .collect()
}
