mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::VoterDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    eframe::run_native(
        "District 29 Voter Data",
        options,
        Box::new(|_cc| Ok(Box::new(VoterDashboardApp::new(config)))),
    )
}
