use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dataset::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMatch {
    /// Names are identical once normalized.
    Exact,
    /// One normalized name contains the other.
    Contains,
    /// Same column type and a shared three-character prefix.
    Prefix,
}

impl KeyMatch {
    pub fn confidence(&self) -> u8 {
        match self {
            KeyMatch::Exact => 100,
            KeyMatch::Contains => 60,
            KeyMatch::Prefix => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinKeySuggestion {
    pub left_key: String,
    pub right_key: String,
    pub confidence: u8,
    pub kind: KeyMatch,
}

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[_\s-]+").expect("static separator pattern"))
}

/// Lowercases a column name and strips underscores, whitespace, and hyphens.
pub fn normalize_key_name(name: &str) -> String {
    separator_pattern()
        .replace_all(&name.to_lowercase(), "")
        .into_owned()
}

fn classify(left: &Column, right: &Column) -> Option<KeyMatch> {
    let ln = normalize_key_name(&left.name);
    let rn = normalize_key_name(&right.name);
    if ln.is_empty() || rn.is_empty() {
        return None;
    }
    if ln == rn {
        Some(KeyMatch::Exact)
    } else if ln.contains(&rn) || rn.contains(&ln) {
        Some(KeyMatch::Contains)
    } else if left.column_type == right.column_type
        && ln.chars().count() > 3
        && ln.chars().take(3).eq(rn.chars().take(3))
    {
        Some(KeyMatch::Prefix)
    } else {
        None
    }
}

/// Proposes join key pairs by column-name similarity, most confident first.
///
/// Every qualifying pair is returned; a column may appear in several
/// suggestions and choosing among them is left to the caller.
pub fn suggest_join_keys(left: &[Column], right: &[Column]) -> Vec<JoinKeySuggestion> {
    left.iter()
        .cartesian_product(right.iter())
        .filter_map(|(lc, rc)| {
            classify(lc, rc).map(|kind| JoinKeySuggestion {
                left_key: lc.name.clone(),
                right_key: rc.name.clone(),
                confidence: kind.confidence(),
                kind,
            })
        })
        .sorted_by(|a, b| b.confidence.cmp(&a.confidence))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnType;

    #[test]
    fn normalization_strips_separators() {
        assert_eq!(normalize_key_name("Customer_ID"), "customerid");
        assert_eq!(normalize_key_name("order - date"), "orderdate");
    }

    #[test]
    fn containment_scores_sixty() {
        let left = [Column::new("id", ColumnType::String)];
        let right = [Column::new("employee_id", ColumnType::String)];
        let suggestions = suggest_join_keys(&left, &right);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].confidence, 60);
        assert_eq!(suggestions[0].kind, KeyMatch::Contains);
    }

    #[test]
    fn prefix_requires_matching_type_and_length() {
        let left = [Column::new("region_code", ColumnType::String)];
        let same_type = [Column::new("regional", ColumnType::String)];
        let other_type = [Column::new("regional", ColumnType::Number)];
        assert_eq!(suggest_join_keys(&left, &same_type)[0].confidence, 30);
        assert!(suggest_join_keys(&left, &other_type).is_empty());

        let short = [Column::new("abc", ColumnType::String)];
        let short_right = [Column::new("abd", ColumnType::String)];
        assert!(suggest_join_keys(&short, &short_right).is_empty());
    }

    #[test]
    fn separator_only_names_are_ignored() {
        let left = [Column::new("_", ColumnType::String)];
        let right = [Column::new("id", ColumnType::String)];
        assert!(suggest_join_keys(&left, &right).is_empty());
    }
}
