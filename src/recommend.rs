//! Data-shape-driven chart recommendations.
//!
//! [`recommend()`] counts the numeric, categorical, and temporal columns that
//! are in play (preferring the caller's field assignment over the raw column
//! list), runs an ordered list of independent scoring rules, keeps the best
//! score per chart type, and ranks the survivors.
//!
//! Ranking is deterministic: ties keep the order in which each chart type was
//! first proposed by the rules, and on an exact score tie between two rules
//! the first proposal (and its reason) is kept.

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    chart::ChartType,
    dataset::{Column, ColumnType},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAssignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default)]
    pub measures: Vec<String>,
}

impl FieldAssignment {
    pub fn new(dimension: Option<&str>, measures: &[&str]) -> Self {
        Self {
            dimension: dimension.map(str::to_string),
            measures: measures.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn dimension(&self) -> Option<&str> {
        self.dimension.as_deref().filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub chart_type: ChartType,
    pub score: u8,
    pub reason: String,
}

/// Column counts the scoring rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataShape {
    pub numeric: usize,
    pub categorical: usize,
    pub temporal: usize,
}

impl DataShape {
    pub fn from_columns(columns: &[Column], assignment: &FieldAssignment) -> Self {
        let count = |ty: ColumnType| columns.iter().filter(|c| c.column_type == ty).count();
        let numeric = if assignment.measures.is_empty() {
            count(ColumnType::Number)
        } else {
            assignment.measures.len()
        };
        let categorical = if assignment.dimension().is_some() {
            1
        } else {
            count(ColumnType::String)
        };
        Self {
            numeric,
            categorical,
            temporal: count(ColumnType::Date),
        }
    }
}

struct Candidates {
    entries: Vec<Recommendation>,
}

impl Candidates {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add(&mut self, chart_type: ChartType, score: u8, reason: &str) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.chart_type == chart_type)
        {
            Some(existing) if existing.score < score => {
                existing.score = score;
                existing.reason = reason.to_string();
            }
            Some(_) => {}
            None => self.entries.push(Recommendation {
                chart_type,
                score,
                reason: reason.to_string(),
            }),
        }
    }

    fn ranked(self) -> Vec<Recommendation> {
        // `sorted_by` is stable, so equal scores keep first-proposal order.
        self.entries
            .into_iter()
            .sorted_by(|a, b| b.score.cmp(&a.score))
            .collect()
    }
}

fn score_shape(shape: DataShape, candidates: &mut Candidates) {
    let DataShape {
        numeric,
        categorical,
        temporal,
    } = shape;

    if categorical >= 1 && numeric >= 1 {
        candidates.add(ChartType::BarClustered, 90, "Compare values across categories");
        candidates.add(ChartType::BarHorizontal, 82, "Horizontal comparison for readability");
        if numeric >= 2 {
            candidates.add(ChartType::BarStacked, 85, "Show composition across categories");
            candidates.add(ChartType::BarPercent, 78, "Show proportional breakdown");
        }
    }

    if temporal >= 1 && numeric >= 1 {
        candidates.add(ChartType::LineSmooth, 95, "Best for time-series trends");
        candidates.add(ChartType::LineStraight, 88, "Precise trend tracking");
        candidates.add(ChartType::AreaSmooth, 84, "Time trend with volume emphasis");
        candidates.add(ChartType::AreaStacked, 80, "Stacked area for cumulative trends");
    }

    if categorical >= 1 && numeric >= 1 {
        candidates.add(ChartType::LineSmooth, 70, "Trend across categories");
        candidates.add(ChartType::AreaSmooth, 65, "Area trend across categories");
    }

    if categorical >= 1 && numeric >= 1 {
        candidates.add(ChartType::Pie, 75, "Show proportions of a whole");
        candidates.add(ChartType::Donut, 74, "Proportions with a clean center");
        candidates.add(ChartType::Treemap, 68, "Hierarchical proportions");
        candidates.add(ChartType::Rose, 60, "Polar proportional chart");
        candidates.add(ChartType::Sunburst, 55, "Nested category breakdown");
    }

    if numeric >= 2 {
        candidates.add(ChartType::Scatter, 85, "Correlation between two measures");
        if numeric >= 3 {
            candidates.add(ChartType::Bubble, 80, "Three-variable relationship");
        }
    }

    if categorical >= 1 && numeric >= 3 {
        candidates.add(ChartType::Radar, 72, "Multi-metric profile comparison");
        candidates.add(ChartType::RadialBar, 60, "Radial metric comparison");
    }

    if categorical >= 1 && numeric >= 2 {
        candidates.add(ChartType::ComboBarLine, 82, "Compare bar + trend line");
        candidates.add(ChartType::ComboAreaLine, 70, "Area + line overlay");
    }

    if numeric >= 1 {
        candidates.add(ChartType::KpiSingle, 60, "Display a single key metric");
        candidates.add(ChartType::Gauge, 55, "Gauge indicator for a metric");
        candidates.add(ChartType::Sparkline, 50, "Compact inline trend");
    }

    if categorical >= 2 && numeric >= 1 {
        candidates.add(ChartType::Heatmap, 75, "Density of values in a matrix");
    }

    candidates.add(ChartType::Table, 40, "Raw data table view");
}

/// Ranks chart types for the given columns and current field assignment.
///
/// The result is never empty: a table view is always offered.
pub fn recommend(columns: &[Column], assignment: &FieldAssignment) -> Vec<Recommendation> {
    let mut candidates = Candidates::new();
    if columns.is_empty() {
        debug!("No columns to score; offering the table view only");
        candidates.add(ChartType::Table, 40, "Raw data table view");
        return candidates.ranked();
    }

    let shape = DataShape::from_columns(columns, assignment);
    debug!(
        "Scoring charts for {} numeric, {} categorical, {} date column(s)",
        shape.numeric, shape.categorical, shape.temporal
    );
    score_shape(shape, &mut candidates);
    candidates.ranked()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(spec: &[(&str, ColumnType)]) -> Vec<Column> {
        spec.iter().map(|(n, t)| Column::new(*n, *t)).collect()
    }

    fn chart_types(recs: &[Recommendation]) -> Vec<ChartType> {
        recs.iter().map(|r| r.chart_type).collect()
    }

    #[test]
    fn duplicate_proposals_keep_the_highest_score() {
        let cols = columns(&[
            ("Date", ColumnType::Date),
            ("Region", ColumnType::String),
            ("Sales", ColumnType::Number),
        ]);
        let recs = recommend(&cols, &FieldAssignment::default());
        let line = recs
            .iter()
            .find(|r| r.chart_type == ChartType::LineSmooth)
            .expect("line smooth");
        assert_eq!(line.score, 95);
        assert_eq!(line.reason, "Best for time-series trends");
        assert_eq!(
            recs.iter()
                .filter(|r| r.chart_type == ChartType::LineSmooth)
                .count(),
            1
        );
    }

    #[test]
    fn equal_scores_keep_rule_order() {
        let cols = columns(&[
            ("Department", ColumnType::String),
            ("Revenue", ColumnType::Number),
        ]);
        let recs = recommend(&cols, &FieldAssignment::default());
        let sixties: Vec<ChartType> = recs
            .iter()
            .filter(|r| r.score == 60)
            .map(|r| r.chart_type)
            .collect();
        assert_eq!(sixties, vec![ChartType::Rose, ChartType::KpiSingle]);
    }

    #[test]
    fn assignment_overrides_column_counts() {
        let cols = columns(&[
            ("Department", ColumnType::String),
            ("Team", ColumnType::String),
            ("Revenue", ColumnType::Number),
            ("Cost", ColumnType::Number),
        ]);
        let unassigned = DataShape::from_columns(&cols, &FieldAssignment::default());
        assert_eq!(
            unassigned,
            DataShape {
                numeric: 2,
                categorical: 2,
                temporal: 0
            }
        );

        let assignment = FieldAssignment::new(Some("Department"), &["Revenue"]);
        let recs = recommend(&cols, &assignment);
        let types = chart_types(&recs);
        assert!(!types.contains(&ChartType::Heatmap));
        assert!(!types.contains(&ChartType::Scatter));
        assert!(!types.contains(&ChartType::BarStacked));
    }

    #[test]
    fn empty_dimension_string_counts_as_unset() {
        let assignment = FieldAssignment::new(Some(""), &[]);
        assert_eq!(assignment.dimension(), None);
    }

    #[test]
    fn zero_columns_yield_only_the_table() {
        let recs = recommend(&[], &FieldAssignment::default());
        assert_eq!(chart_types(&recs), vec![ChartType::Table]);
        assert_eq!(recs[0].score, 40);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let recs = recommend(&[], &FieldAssignment::default());
        let json = serde_json::to_value(&recs[0]).expect("json");
        assert_eq!(json["chartType"], "TABLE");
        assert_eq!(json["score"], 40);
    }
}
