//! Categorical distributions and share-of-total ranking.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::validate;
use crate::error::MetricsError;

/// One category with its raw count, as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: f64,
}

/// A validated set of `(category, count)` entries. Non-blank categories
/// are unique; input order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoricalDistribution {
    entries: Vec<CategoryCount>,
}

/// One ranked category with its percentage of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    /// Share of the pre-filter total, rounded to two decimals.
    pub percentage: f64,
}

impl CategoricalDistribution {
    /// Validate an aligned `{<category_key>: string[], <count_key>:
    /// number[]}` payload. Duplicate non-blank categories violate the
    /// uniqueness invariant and fail here.
    pub fn from_payload(
        payload: &Value,
        category_key: &str,
        count_key: &str,
    ) -> Result<Self, MetricsError> {
        let (labels, counts) = validate::aligned_columns(payload, category_key, count_key)?;
        let mut seen = HashSet::new();
        for label in &labels {
            if !label.trim().is_empty() && !seen.insert(label.as_str()) {
                return Err(MetricsError::Validation(format!(
                    "duplicate `{category_key}` entry: {label:?}"
                )));
            }
        }
        let entries = labels
            .into_iter()
            .zip(counts)
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CategoryCount] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank categories by share of total and keep the top `top`.
    ///
    /// The total is summed over the unfiltered set before blank
    /// categories are dropped, so survivors' percentages reflect the
    /// true total rather than renormalizing around the exclusion. Ties
    /// keep their input order (stable sort). A zero total yields zero
    /// percentages across the board, never NaN.
    pub fn rank(&self, top: usize) -> Vec<CategoryShare> {
        let total: f64 = self.entries.iter().map(|e| e.count).sum();
        let mut shares: Vec<CategoryShare> = self
            .entries
            .iter()
            .filter(|e| !e.category.trim().is_empty())
            .map(|e| CategoryShare {
                category: e.category.clone(),
                percentage: if total == 0.0 {
                    0.0
                } else {
                    round2(e.count / total * 100.0)
                },
            })
            .collect();
        shares.sort_by(|a, b| {
            b.percentage
                .partial_cmp(&a.percentage)
                .unwrap_or(Ordering::Equal)
        });
        shares.truncate(top);
        shares
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dist(payload: Value) -> CategoricalDistribution {
        CategoricalDistribution::from_payload(&payload, "country", "counts").unwrap()
    }

    #[test]
    fn percentages_use_the_pre_filter_total() {
        // The blank category is excluded from the ranking but not from
        // the total: survivors divide by 100, not by 90.
        let d = dist(json!({
            "country": ["DE", "", "US"],
            "counts": [10, 10, 80],
        }));
        let ranked = d.rank(15);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].category, "US");
        assert_eq!(ranked[0].percentage, 80.0);
        assert_eq!(ranked[1].percentage, 10.0);
        // Re-slicing the survivors as their own total would give
        // 88.89/11.11 instead; assert we did not do that.
        assert!((ranked[0].percentage + ranked[1].percentage - 90.0).abs() < 1e-9);
    }

    #[test]
    fn ranking_is_descending_and_truncated() {
        let countries: Vec<String> = (0..20).map(|i| format!("C{i:02}")).collect();
        let counts: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let d = dist(json!({ "country": countries, "counts": counts }));
        let ranked = d.rank(15);
        assert_eq!(ranked.len(), 15);
        assert_eq!(ranked[0].category, "C19");
        for pair in ranked.windows(2) {
            assert!(pair[0].percentage >= pair[1].percentage);
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let d = dist(json!({
            "country": ["AA", "BB", "CC"],
            "counts": [5, 5, 5],
        }));
        let ranked = d.rank(15);
        let order: Vec<&str> = ranked.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(order, vec!["AA", "BB", "CC"]);
    }

    #[test]
    fn zero_total_yields_zero_percentages() {
        let d = dist(json!({
            "country": ["DE", "US"],
            "counts": [0, 0],
        }));
        let ranked = d.rank(15);
        assert_eq!(ranked.len(), 2);
        for share in &ranked {
            assert_eq!(share.percentage, 0.0);
            assert!(!share.percentage.is_nan());
        }
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        let d = dist(json!({
            "country": ["DE", "US", "FR"],
            "counts": [1, 1, 1],
        }));
        let ranked = d.rank(15);
        // 1/3 of 100 -> 33.33
        assert_eq!(ranked[0].percentage, 33.33);
    }

    #[test]
    fn duplicate_categories_fail_validation() {
        let err = CategoricalDistribution::from_payload(
            &json!({ "country": ["DE", "DE"], "counts": [1, 2] }),
            "country",
            "counts",
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::Validation(_)));
        assert!(err.to_string().contains("DE"), "got: {err}");
    }

    #[test]
    fn repeated_blank_categories_are_tolerated() {
        // Blanks are excluded before ranking, so several of them do not
        // count as duplicates.
        let d = dist(json!({
            "country": ["", " ", "US"],
            "counts": [5, 5, 10],
        }));
        let ranked = d.rank(15);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].category, "US");
        assert_eq!(ranked[0].percentage, 50.0);
    }
}
