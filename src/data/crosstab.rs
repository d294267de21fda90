use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Table};

/// Dense contingency grid of two columns.
///
/// Rows are the distinct `y` values, columns the distinct `x` values, both in
/// value order. Every (y, x) pair has a cell; unobserved pairs hold zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContingencyTable {
    pub x_column: String,
    pub y_column: String,
    pub x_values: Vec<CellValue>,
    pub y_values: Vec<CellValue>,
    /// `counts[y][x]`
    pub counts: Vec<Vec<usize>>,
}

impl ContingencyTable {
    /// No rows and no columns.
    pub fn is_empty(&self) -> bool {
        self.y_values.is_empty() && self.x_values.is_empty()
    }

    pub fn get(&self, y: &CellValue, x: &CellValue) -> Option<usize> {
        let yi = self.y_values.iter().position(|v| v == y)?;
        let xi = self.x_values.iter().position(|v| v == x)?;
        Some(self.counts[yi][xi])
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Largest cell, used to scale the colour map.
    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    /// The grid as nested maps: y value → x value → count.
    pub fn to_nested(&self) -> BTreeMap<CellValue, BTreeMap<CellValue, usize>> {
        self.y_values
            .iter()
            .zip(&self.counts)
            .map(|(y, row)| {
                let cells = self.x_values.iter().cloned().zip(row.iter().copied()).collect();
                (y.clone(), cells)
            })
            .collect()
    }
}

/// Count rows per (`x`, `y`) combination. `None` if either column is unknown.
/// `x` and `y` may name the same column.
pub fn cross_tabulate(table: &Table, x: &str, y: &str) -> Option<ContingencyTable> {
    let xi = table.column_index(x)?;
    let yi = table.column_index(y)?;

    let mut pairs: BTreeMap<(&CellValue, &CellValue), usize> = BTreeMap::new();
    let mut x_seen: BTreeSet<&CellValue> = BTreeSet::new();
    let mut y_seen: BTreeSet<&CellValue> = BTreeSet::new();
    for row in table.rows() {
        let (xv, yv) = (&row[xi], &row[yi]);
        x_seen.insert(xv);
        y_seen.insert(yv);
        *pairs.entry((yv, xv)).or_insert(0) += 1;
    }

    let counts = y_seen
        .iter()
        .map(|yv| {
            x_seen
                .iter()
                .map(|xv| pairs.get(&(*yv, *xv)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    Some(ContingencyTable {
        x_column: x.to_string(),
        y_column: y.to_string(),
        x_values: x_seen.into_iter().cloned().collect(),
        y_values: y_seen.into_iter().cloned().collect(),
        counts,
    })
}
