use std::collections::BTreeMap;

use super::model::{CellValue, Table};

/// Occurrence counts of each distinct value of one column.
///
/// Only observed values are present; there are no zero-count entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub column: String,
    pub counts: BTreeMap<CellValue, usize>,
}

impl Distribution {
    /// Sum of all counts, i.e. the number of rows summarized.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, value: &CellValue) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Percentage share of `value`, 0–100.
    pub fn percent(&self, value: &CellValue) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.count(value) as f64 * 100.0 / total as f64,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellValue, usize)> {
        self.counts.iter().map(|(v, c)| (v, *c))
    }
}

/// Count the values of `column`. `None` if the table has no such column.
pub fn distribution(table: &Table, column: &str) -> Option<Distribution> {
    let idx = table.column_index(column)?;
    let mut counts = BTreeMap::new();
    for value in table.column_values(idx) {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    Some(Distribution {
        column: column.to_string(),
        counts,
    })
}

/// One [`Distribution`] per requested column, each computed independently
/// over the same table. Unknown columns are skipped.
pub fn summarize<S: AsRef<str>>(table: &Table, columns: &[S]) -> Vec<Distribution> {
    columns
        .iter()
        .filter_map(|col| {
            let dist = distribution(table, col.as_ref());
            if dist.is_none() {
                log::warn!("Skipping distribution for unknown column {:?}", col.as_ref());
            }
            dist
        })
        .collect()
}
