use eframe::egui::Ui;
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Table;

/// Scrollable grid of the filtered rows.
pub fn data_table(ui: &mut Ui, table: &Table) {
    if table.is_empty() {
        ui.label("No students match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(300.0)
        .columns(TableColumn::auto().at_least(60.0), table.columns().len())
        .header(22.0, |mut header| {
            for column in table.columns() {
                header.col(|ui| {
                    ui.strong(&column.name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.len(), |mut row| {
                let index = row.index();
                for value in &table.rows()[index] {
                    row.col(|ui| {
                        ui.label(value.to_string());
                    });
                }
            });
        });
}
