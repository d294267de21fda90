mod app;
mod color;
mod config;
mod dashboard;
mod data;
mod error;
mod state;
mod theme;
mod ui;

use app::StudentDashboardApp;
use config::DashboardConfig;
use eframe::egui;
use theme::Theme;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::default();
    let theme = Theme::load_or_default(&config.stylesheet_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            theme.apply(&cc.egui_ctx);
            Ok(Box::new(StudentDashboardApp::new(config)))
        }),
    )
}
