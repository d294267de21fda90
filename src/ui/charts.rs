use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{Legend, Plot, PlotPoint, PlotPoints, Polygon, Text};

use crate::color::{viridis, ColorMap};
use crate::data::crosstab::ContingencyTable;
use crate::data::model::CellValue;
use crate::data::summary::Distribution;
use crate::state::AppState;

/// Inner radius of the donut, relative to the outer radius.
const HOLE: f64 = 0.3;
/// Arc resolution: one convex quad per this many radians.
const ARC_STEP: f64 = TAU / 180.0;
const EMPTY_MESSAGE: &str = "No students match the current filters.";

// ---------------------------------------------------------------------------
// Pie charts
// ---------------------------------------------------------------------------

/// Column picker plus one donut chart per selected column.
pub fn pie_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Generate Pie Chart");

    let columns: Vec<String> = state
        .table
        .as_ref()
        .map(|t| t.column_names().map(str::to_string).collect())
        .unwrap_or_default();

    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Select column(s) for Pie Chart:");
        for col in &columns {
            let selected = state.selections.pie_columns.contains(col);
            if ui.selectable_label(selected, col).clicked() {
                state.toggle_pie_column(col);
            }
        }
    });

    let Some(view) = &state.view else {
        return;
    };
    for dist in &view.distributions {
        ui.add_space(8.0);
        pie_chart(ui, dist);
    }
}

/// One slice of a pie: where it starts, how far it sweeps (radians,
/// clockwise from 12 o'clock) and its share in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<'a> {
    pub value: &'a CellValue,
    pub start: f64,
    pub sweep: f64,
    pub percent: f64,
}

pub fn slices(dist: &Distribution) -> Vec<Slice<'_>> {
    let total = dist.total();
    if total == 0 {
        return Vec::new();
    }
    let mut start = FRAC_PI_2;
    dist.iter()
        .map(|(value, count)| {
            let slice = Slice {
                value,
                start,
                sweep: count as f64 / total as f64 * TAU,
                percent: dist.percent(value),
            };
            start -= slice.sweep;
            slice
        })
        .collect()
}

/// Convex quads approximating the ring segment of a slice.
fn ring_segments(slice: &Slice<'_>) -> Vec<Vec<[f64; 2]>> {
    let n = (slice.sweep / ARC_STEP).ceil().max(1.0) as usize;
    let at = |angle: f64, r: f64| [r * angle.cos(), r * angle.sin()];
    (0..n)
        .map(|k| {
            let a0 = slice.start - slice.sweep * k as f64 / n as f64;
            let a1 = slice.start - slice.sweep * (k + 1) as f64 / n as f64;
            vec![at(a0, 1.0), at(a1, 1.0), at(a1, HOLE), at(a0, HOLE)]
        })
        .collect()
}

pub fn pie_chart(ui: &mut Ui, dist: &Distribution) {
    ui.label(RichText::new(format!("{} Distribution", dist.column)).strong());

    if dist.is_empty() {
        ui.label(EMPTY_MESSAGE);
        return;
    }

    let colors = ColorMap::new(dist.counts.keys());
    let slices = slices(dist);

    Plot::new(("pie", dist.column.as_str()))
        .height(280.0)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for slice in &slices {
                let label = slice.value.to_string();
                let fill = colors.color_for(slice.value);
                for quad in ring_segments(slice) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(quad))
                            .fill_color(fill)
                            .stroke(Stroke::new(0.0, fill))
                            .name(&label),
                    );
                }

                let mid = slice.start - slice.sweep / 2.0;
                let r = (1.0 + HOLE) / 2.0;
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(r * mid.cos(), r * mid.sin()),
                        RichText::new(format!("{label}\n{:.1}%", slice.percent)).size(12.0),
                    )
                    .color(Color32::WHITE)
                    .anchor(Align2::CENTER_CENTER),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// X/Y pickers plus the contingency heatmap.
pub fn heatmap_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Heatmap (Comparison of Two Fields)");

    let columns: Vec<String> = state
        .table
        .as_ref()
        .map(|t| t.column_names().map(str::to_string).collect())
        .unwrap_or_default();

    if columns.is_empty() {
        ui.label("The uploaded sheet has no columns to compare.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let current_x = state.selections.heatmap_x.clone().unwrap_or_default();
        let current_y = state.selections.heatmap_y.clone().unwrap_or_default();

        ui.label("Select X-axis");
        egui::ComboBox::from_id_salt("heatmap_x")
            .selected_text(&current_x)
            .show_ui(ui, |ui: &mut Ui| {
                for col in &columns {
                    if ui.selectable_label(current_x == *col, col).clicked() {
                        state.set_heatmap_x(col);
                    }
                }
            });

        ui.label("Select Y-axis");
        egui::ComboBox::from_id_salt("heatmap_y")
            .selected_text(&current_y)
            .show_ui(ui, |ui: &mut Ui| {
                for col in &columns {
                    if ui.selectable_label(current_y == *col, col).clicked() {
                        state.set_heatmap_y(col);
                    }
                }
            });
    });

    if let Some(ct) = state.view.as_ref().and_then(|v| v.contingency.as_ref()) {
        heatmap(ui, ct);
    }
}

pub fn heatmap(ui: &mut Ui, ct: &ContingencyTable) {
    ui.label(RichText::new(format!("Heatmap: {} vs {}", ct.x_column, ct.y_column)).strong());

    if ct.is_empty() {
        ui.label(EMPTY_MESSAGE);
        return;
    }

    let max = ct.max_count().max(1) as f64;
    let n_x = ct.x_values.len() as f64;
    let n_y = ct.y_values.len() as f64;

    Plot::new(("heatmap", ct.x_column.as_str(), ct.y_column.as_str()))
        .height(320.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-2.0)
        .include_x(n_x)
        .include_y(-1.5)
        .include_y(n_y)
        .show(ui, |plot_ui| {
            for (yi, row) in ct.counts.iter().enumerate() {
                for (xi, &count) in row.iter().enumerate() {
                    let t = count as f64 / max;
                    let (x, y) = (xi as f64, yi as f64);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(vec![
                            [x - 0.5, y - 0.5],
                            [x + 0.5, y - 0.5],
                            [x + 0.5, y + 0.5],
                            [x - 0.5, y + 0.5],
                        ]))
                        .fill_color(viridis(t))
                        .stroke(Stroke::new(1.0, Color32::from_gray(30))),
                    );
                    let ink = if t < 0.6 { Color32::WHITE } else { Color32::BLACK };
                    plot_ui.text(Text::new(PlotPoint::new(x, y), count.to_string()).color(ink));
                }
            }

            for (xi, value) in ct.x_values.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(xi as f64, -0.7), value.to_string())
                        .anchor(Align2::CENTER_TOP),
                );
            }
            for (yi, value) in ct.y_values.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(-0.7, yi as f64), value.to_string())
                        .anchor(Align2::RIGHT_CENTER),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;
    use crate::data::summary::distribution;

    #[test]
    fn slices_cover_the_full_circle() {
        let t = table(&["Category"], &[&["A"], &["A"], &["B"], &["C"]]);
        let dist = distribution(&t, "Category").unwrap();
        let s = slices(&dist);
        assert_eq!(s.len(), 3);
        let sweep: f64 = s.iter().map(|s| s.sweep).sum();
        assert!((sweep - TAU).abs() < 1e-9);
        let pct: f64 = s.iter().map(|s| s.percent).sum();
        assert!((pct - 100.0).abs() < 1e-9);
        assert_eq!(s[0].percent, 50.0);
        // slices follow each other clockwise
        assert!((s[1].start - (s[0].start - s[0].sweep)).abs() < 1e-12);
    }

    #[test]
    fn empty_distribution_has_no_slices() {
        let t = table(&["Category"], &[]);
        assert!(slices(&distribution(&t, "Category").unwrap()).is_empty());
    }

    #[test]
    fn ring_segments_stay_inside_the_ring() {
        let v = CellValue::from("A");
        let slice = Slice {
            value: &v,
            start: FRAC_PI_2,
            sweep: TAU,
            percent: 100.0,
        };
        let quads = ring_segments(&slice);
        assert!(quads.len() >= 180);
        for p in quads.iter().flatten() {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            assert!(r > HOLE - 1e-9 && r < 1.0 + 1e-9);
        }
    }
}
