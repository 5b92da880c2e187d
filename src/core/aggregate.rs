use crate::domain::model::{TradeField, TradeItem, YearSummary};
use std::collections::HashMap;

/// `year` value the upstream uses for its grand-total row.
pub const DEFAULT_TOTAL_SENTINEL: &str = "총계";

/// Folds items into one [`YearSummary`] per distinct year.
#[derive(Debug, Clone)]
pub struct YearAggregator {
    total_sentinel: String,
}

impl Default for YearAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_SENTINEL)
    }
}

impl YearAggregator {
    pub fn new(total_sentinel: impl Into<String>) -> Self {
        Self {
            total_sentinel: total_sentinel.into(),
        }
    }

    pub fn total_sentinel(&self) -> &str {
        &self.total_sentinel
    }

    /// Summaries come out in the order each year is first seen, not sorted.
    /// Grand-total rows are skipped.
    pub fn aggregate(&self, items: &[TradeItem]) -> Vec<YearSummary> {
        let mut summaries: Vec<YearSummary> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut skipped = 0usize;

        for item in items {
            let year = item.year();
            if year == self.total_sentinel {
                skipped += 1;
                continue;
            }

            let slot = *index.entry(year).or_insert_with(|| {
                summaries.push(YearSummary::new(year));
                summaries.len() - 1
            });
            summaries[slot].accumulate(item);
        }

        tracing::debug!(
            "Aggregated {} items into {} years ({} total rows skipped)",
            items.len(),
            summaries.len(),
            skipped
        );
        summaries
    }
}

/// Sums one column over every item. No year grouping and no sentinel filter,
/// so a grand-total row counts too.
pub fn sum_field(items: &[TradeItem], field: TradeField) -> i64 {
    items
        .iter()
        .fold(0i64, |total, item| total.saturating_add(item.amount(field)))
}
