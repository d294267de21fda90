use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Filter set: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// If a column is absent or its set is empty, it means "no filter" (show all).
pub type FilterSet = BTreeMap<String, BTreeSet<CellValue>>;

/// Options offered for each categorical column: its distinct values in the
/// loaded table, in value order.
pub fn filter_options(table: &Table) -> BTreeMap<String, BTreeSet<CellValue>> {
    table
        .categorical_columns()
        .map(|col| (col.name.clone(), table.unique_values(&col.name)))
        .collect()
}

/// Whether `filters` constrains anything at all.
pub fn is_active(filters: &FilterSet) -> bool {
    filters.values().any(|selected| !selected.is_empty())
}

/// Return a new table holding the rows that pass all active filters, in
/// their original order.
///
/// A row passes a column filter when:
/// * The column is not present in `filters` → passes (no constraint)
/// * The filter set for that column is empty → passes (no constraint)
/// * The row's value for that column is in the selected set → passes
///
/// A filter on a column the table does not have sees every row as
/// [`CellValue::Null`].
pub fn apply_filters(table: &Table, filters: &FilterSet) -> Table {
    let active: Vec<(Option<usize>, &BTreeSet<CellValue>)> = filters
        .iter()
        .filter(|(_, selected)| !selected.is_empty())
        .map(|(col, selected)| (table.column_index(col), selected))
        .collect();

    if active.is_empty() {
        return table.clone();
    }

    let rows = table
        .rows()
        .iter()
        .filter(|row| {
            active.iter().all(|(idx, selected)| match idx {
                Some(i) => selected.contains(&row[*i]),
                None => selected.contains(&CellValue::Null),
            })
        })
        .cloned()
        .collect();

    table.with_rows(rows)
}
