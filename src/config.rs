use std::path::PathBuf;

/// Static settings for the dashboard window and its defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    /// Optional stylesheet; skipped silently when absent.
    pub stylesheet_path: PathBuf,
    /// Columns pre-selected for pie charts, when present.
    pub preferred_pie_columns: Vec<String>,
    /// Preferred heatmap axes, when present.
    pub preferred_heatmap_x: String,
    pub preferred_heatmap_y: String,
    /// Number of parsed uploads kept in memory.
    pub cache_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Teacher's Dashboard – Student Information".to_string(),
            window_size: [1280.0, 860.0],
            min_window_size: [720.0, 480.0],
            stylesheet_path: PathBuf::from("styles.json"),
            preferred_pie_columns: vec!["Gender".to_string(), "Category".to_string()],
            preferred_heatmap_x: "Gender".to_string(),
            preferred_heatmap_y: "Category".to_string(),
            cache_capacity: 4,
        }
    }
}
