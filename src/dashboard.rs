use crate::config::DashboardConfig;
use crate::data::crosstab::{cross_tabulate, ContingencyTable};
use crate::data::filter::{apply_filters, FilterSet};
use crate::data::model::Table;
use crate::data::summary::{summarize, Distribution};

// ---------------------------------------------------------------------------
// Chart selections
// ---------------------------------------------------------------------------

/// Which columns feed the pie charts and the heatmap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    pub pie_columns: Vec<String>,
    pub heatmap_x: Option<String>,
    pub heatmap_y: Option<String>,
}

impl Selections {
    /// Defaults for a freshly loaded table: every preferred pie column that
    /// exists, and the preferred heatmap axes or else the first and second
    /// columns.
    ///
    /// A single-column table uses that column for both axes; a table without
    /// columns gets no heatmap axes.
    pub fn defaults_for(table: &Table, config: &DashboardConfig) -> Self {
        let pie_columns = config
            .preferred_pie_columns
            .iter()
            .filter(|col| table.has_column(col))
            .cloned()
            .collect();

        Self {
            pie_columns,
            heatmap_x: pick_axis(table, &config.preferred_heatmap_x, 0),
            heatmap_y: pick_axis(table, &config.preferred_heatmap_y, 1),
        }
    }
}

fn pick_axis(table: &Table, preferred: &str, fallback: usize) -> Option<String> {
    if table.has_column(preferred) {
        return Some(preferred.to_string());
    }
    let columns = table.columns();
    let last = columns.len().checked_sub(1)?;
    Some(columns[fallback.min(last)].name.clone())
}

// ---------------------------------------------------------------------------
// Render pass
// ---------------------------------------------------------------------------

/// Everything the output surfaces show for one interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub filtered: Table,
    /// One per selected pie column, in selection order.
    pub distributions: Vec<Distribution>,
    /// `None` when no valid heatmap axes are selected.
    pub contingency: Option<ContingencyTable>,
}

impl DashboardView {
    /// The filters removed every row. Not an error; surfaces show an
    /// empty state.
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Map the loaded table, the active filters and the chart selections to
/// what should be displayed. Holds no state between calls.
pub fn render(table: &Table, filters: &FilterSet, selections: &Selections) -> DashboardView {
    let filtered = apply_filters(table, filters);
    let distributions = summarize(&filtered, &selections.pie_columns);
    let contingency = match (&selections.heatmap_x, &selections.heatmap_y) {
        (Some(x), Some(y)) => cross_tabulate(&filtered, x, y),
        _ => None,
    };

    DashboardView {
        filtered,
        distributions,
        contingency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;
    use crate::data::model::CellValue;
    use std::collections::BTreeSet;

    fn v(s: &str) -> CellValue {
        CellValue::from(s)
    }

    fn filter_on(col: &str, vals: &[&str]) -> FilterSet {
        let mut f = FilterSet::new();
        f.insert(col.to_string(), vals.iter().map(|s| v(s)).collect::<BTreeSet<_>>());
        f
    }

    fn selections(pies: &[&str], x: &str, y: &str) -> Selections {
        Selections {
            pie_columns: pies.iter().map(|s| s.to_string()).collect(),
            heatmap_x: Some(x.to_string()),
            heatmap_y: Some(y.to_string()),
        }
    }

    #[test]
    fn gender_filter_scenario() {
        let t = table(
            &["Gender", "Category"],
            &[&["F", "A"], &["M", "A"], &["F", "B"]],
        );
        let view = render(
            &t,
            &filter_on("Gender", &["F"]),
            &selections(&["Category"], "Category", "Gender"),
        );

        assert_eq!(view.filtered.len(), 2);
        let dist = &view.distributions[0];
        assert_eq!(dist.counts.len(), 2);
        assert_eq!(dist.count(&v("A")), 1);
        assert_eq!(dist.count(&v("B")), 1);

        let ct = view.contingency.unwrap();
        let nested = ct.to_nested();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[&v("F")][&v("A")], 1);
        assert_eq!(nested[&v("F")][&v("B")], 1);
        assert!(!nested.contains_key(&v("M")));
    }

    #[test]
    fn absent_value_gives_empty_results_without_error() {
        let t = table(&["Gender", "Category"], &[&["F", "A"], &["M", "B"]]);
        let view = render(
            &t,
            &filter_on("Gender", &["X"]),
            &selections(&["Gender", "Category"], "Gender", "Category"),
        );
        assert!(view.is_empty());
        assert!(view.distributions.iter().all(|d| d.is_empty()));
        assert!(view.contingency.unwrap().is_empty());
    }

    #[test]
    fn sums_match_filtered_row_count() {
        let t = table(
            &["Gender", "Category", "House"],
            &[
                &["F", "A", "Red"],
                &["M", "B", "Blue"],
                &["F", "B", "Red"],
                &["M", "C", "Green"],
                &["F", "C", "Blue"],
            ],
        );
        let filters = filter_on("House", &["Red", "Blue"]);
        let view = render(&t, &filters, &selections(&["Gender", "Category", "House"], "House", "Category"));
        assert_eq!(view.filtered.len(), 4);
        for dist in &view.distributions {
            assert_eq!(dist.total(), view.filtered.len());
        }
        assert_eq!(view.contingency.unwrap().total(), view.filtered.len());
    }

    #[test]
    fn render_leaves_source_untouched() {
        let t = table(&["Gender"], &[&["F"], &["M"]]);
        let before = t.clone();
        render(&t, &filter_on("Gender", &["F"]), &Selections::default());
        assert_eq!(t, before);
    }

    #[test]
    fn missing_axis_gives_no_contingency() {
        let t = table(&["Gender"], &[&["F"]]);
        let mut sel = selections(&[], "Gender", "Gender");
        sel.heatmap_y = None;
        assert!(render(&t, &FilterSet::new(), &sel).contingency.is_none());
    }

    #[test]
    fn defaults_prefer_gender_and_category() {
        let t = table(&["Name", "Category", "Gender"], &[&["Asha", "A", "F"]]);
        let sel = Selections::defaults_for(&t, &DashboardConfig::default());
        assert_eq!(sel.pie_columns, vec!["Gender", "Category"]);
        assert_eq!(sel.heatmap_x.as_deref(), Some("Gender"));
        assert_eq!(sel.heatmap_y.as_deref(), Some("Category"));
    }

    #[test]
    fn defaults_fall_back_to_first_two_columns() {
        let t = table(&["Name", "House", "Club"], &[&["Asha", "Red", "Chess"]]);
        let sel = Selections::defaults_for(&t, &DashboardConfig::default());
        assert!(sel.pie_columns.is_empty());
        assert_eq!(sel.heatmap_x.as_deref(), Some("Name"));
        assert_eq!(sel.heatmap_y.as_deref(), Some("House"));
    }

    #[test]
    fn defaults_for_narrow_tables() {
        let config = DashboardConfig::default();

        let one = table(&["House"], &[&["Red"]]);
        let sel = Selections::defaults_for(&one, &config);
        assert_eq!(sel.heatmap_x.as_deref(), Some("House"));
        assert_eq!(sel.heatmap_y.as_deref(), Some("House"));

        let none = Table::from_records(Vec::new(), Vec::new());
        let sel = Selections::defaults_for(&none, &config);
        assert_eq!(sel, Selections::default());
        assert!(render(&none, &FilterSet::new(), &sel).contingency.is_none());
    }
}
