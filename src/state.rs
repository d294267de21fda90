use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::dashboard::{render, DashboardView, Selections};
use crate::data::cache::{ContentHash, TableCache};
use crate::data::filter::{filter_options, is_active, FilterSet};
use crate::data::model::{CellValue, Table};
use crate::error::LoadError;

/// Shown whenever there is no usable table.
pub const UPLOAD_PROMPT: &str = "Please upload a spreadsheet to view student details.";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded table (None until the user uploads a valid file).
    pub table: Option<Arc<Table>>,

    /// Name and content hash of the current upload.
    pub upload: Option<(String, ContentHash)>,

    /// Filter widget options per categorical column, from the loaded table.
    pub filter_options: BTreeMap<String, BTreeSet<CellValue>>,

    /// Per-column filter selections.
    pub filters: FilterSet,

    /// Pie-chart and heatmap column choices.
    pub selections: Selections,

    /// Output of the last render pass.
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    cache: TableCache,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            cache: TableCache::new(config.cache_capacity),
            config,
            table: None,
            upload: None,
            filter_options: BTreeMap::new(),
            filters: FilterSet::new(),
            selections: Selections::default(),
            view: None,
            status_message: None,
        }
    }

    /// Replace the current table with a new upload.
    ///
    /// On failure nothing of the previous upload is kept and the status asks
    /// for a valid file.
    pub fn ingest_upload(&mut self, name: &str, bytes: &[u8]) -> Result<(), LoadError> {
        match self.cache.get_or_load(Some(name), bytes) {
            Ok((hash, table)) => {
                self.set_table(name, hash, table);
                Ok(())
            }
            Err(e) => {
                self.clear();
                self.status_message = Some(format!("Error: {e}. {UPLOAD_PROMPT}"));
                Err(e)
            }
        }
    }

    fn set_table(&mut self, name: &str, hash: ContentHash, table: Arc<Table>) {
        self.filter_options = filter_options(&table);
        self.filters = FilterSet::new();
        self.selections = Selections::defaults_for(&table, &self.config);
        self.upload = Some((name.to_string(), hash));
        self.table = Some(table);
        self.status_message = None;
        self.recompute();
    }

    /// Close the current upload and drop its cached parse.
    pub fn close_upload(&mut self) {
        if let Some((_, hash)) = &self.upload {
            self.cache.invalidate(hash);
        }
        self.clear();
        self.status_message = None;
    }

    /// Forget the current upload.
    pub fn clear(&mut self) {
        self.table = None;
        self.upload = None;
        self.filter_options.clear();
        self.filters.clear();
        self.selections = Selections::default();
        self.view = None;
    }

    /// Re-run the render pipeline for the current inputs.
    pub fn recompute(&mut self) {
        self.view = self
            .table
            .as_ref()
            .map(|table| render(table, &self.filters, &self.selections));
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.recompute();
    }

    /// Select every value of a column. The result is the same rows as no
    /// filter, but the checkboxes show as ticked.
    pub fn select_all(&mut self, column: &str) {
        if let Some(all_vals) = self.filter_options.get(column) {
            self.filters.insert(column.to_string(), all_vals.clone());
            self.recompute();
        }
    }

    /// Remove a column's filter.
    pub fn clear_filter(&mut self, column: &str) {
        self.filters.remove(column);
        self.recompute();
    }

    pub fn clear_all_filters(&mut self) {
        self.filters.clear();
        self.recompute();
    }

    /// Add or remove a pie-chart column, keeping selection order.
    pub fn toggle_pie_column(&mut self, column: &str) {
        let pies = &mut self.selections.pie_columns;
        match pies.iter().position(|c| c == column) {
            Some(i) => {
                pies.remove(i);
            }
            None => pies.push(column.to_string()),
        }
        self.recompute();
    }

    pub fn set_heatmap_x(&mut self, column: &str) {
        self.selections.heatmap_x = Some(column.to_string());
        self.recompute();
    }

    pub fn set_heatmap_y(&mut self, column: &str) {
        self.selections.heatmap_y = Some(column.to_string());
        self.recompute();
    }

    pub fn has_active_filters(&self) -> bool {
        is_active(&self.filters)
    }

    /// Rows in the loaded table and rows surviving the filters.
    pub fn row_counts(&self) -> Option<(usize, usize)> {
        let table = self.table.as_ref()?;
        let visible = self.view.as_ref().map_or(table.len(), |v| v.filtered.len());
        Some((table.len(), visible))
    }
}
