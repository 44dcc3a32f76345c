use eframe::egui::{self, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, tables, treemap};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VoterDashboardApp {
    pub state: AppState,
}

impl VoterDashboardApp {
    /// Create the app and fetch the configured extract once up front.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.reload();
        Self { state }
    }
}

impl eframe::App for VoterDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: treemap and cross-tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("District 29 Voter Data");
            ui.separator();

            let Some(views) = &self.state.views else {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("No voter data loaded  (File → Open… or Reload)");
                });
                return;
            };

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    treemap::count_treemap(ui, &self.state, &views.count_tree);
                    ui.add_space(12.0);
                    tables::pivot_table(ui, &views.pivot);
                    ui.add_space(12.0);
                    tables::participation_table(ui, &views.histogram);
                });
        });
    }
}
