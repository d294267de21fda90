use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::{
    CSV_EXTENSIONS, JSON_EXTENSIONS, PARQUET_EXTENSIONS, SPREADSHEET_EXTENSIONS,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: one checkbox list per categorical column.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    if state.table.is_none() {
        ui.label("No spreadsheet loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the loop.
    let options = state.filter_options.clone();
    if options.is_empty() {
        ui.label("No text columns to filter by.");
        return;
    }

    if state.has_active_filters() && ui.button("Clear all filters").clicked() {
        state.clear_all_filters();
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, all_values) in &options {
                // Show count of selected / total in the header
                let n_selected = state.filters.get(col).map_or(0, |s| s.len());
                let header_text = match n_selected {
                    0 => format!("Filter by {col}  (all)"),
                    n => format!("Filter by {col}  ({n}/{})", all_values.len()),
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("Clear").clicked() {
                                state.clear_filter(col);
                            }
                        });

                        for val in all_values {
                            let mut checked = state
                                .filters
                                .get(col)
                                .is_some_and(|selected| selected.contains(val));
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.table.is_some(), egui::Button::new("Close"))
                .clicked()
            {
                state.close_upload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some((name, _)), Some((total, visible))) = (&state.upload, state.row_counts()) {
            ui.label(format!("{name}: {total} students, {visible} shown"));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload student data")
        .add_filter("Spreadsheets", SPREADSHEET_EXTENSIONS)
        .add_filter("CSV", CSV_EXTENSIONS)
        .add_filter("JSON", JSON_EXTENSIONS)
        .add_filter("Parquet", PARQUET_EXTENSIONS)
        .pick_file();

    let Some(path) = file else {
        return;
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match std::fs::read(&path) {
        Ok(bytes) => {
            if let Err(e) = state.ingest_upload(&name, &bytes) {
                log::error!("Failed to load {}: {e:#}", path.display());
            }
        }
        Err(e) => {
            log::error!("Failed to read {}: {e}", path.display());
            state.clear();
            state.status_message = Some(format!(
                "Error: {e}. {}",
                crate::state::UPLOAD_PROMPT
            ));
        }
    }
}
