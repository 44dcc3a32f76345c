use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::AgeBracket;
use crate::state::{AppState, Dimension};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No voter data loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let statuses = table.statuses.clone();
    let elections = table.elections.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Status: single select ----
            ui.strong("Status");
            let current = state.criteria.status.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("status_select")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for status in &statuses {
                        if ui.selectable_label(current == *status, status).clicked() {
                            state.set_status(status.clone());
                        }
                    }
                });
            ui.separator();

            multi_select(ui, state, "Race", Dimension::Race);
            multi_select(ui, state, "Gender", Dimension::Gender);

            // ---- Age brackets: fixed four ----
            let n_brackets = state.criteria.age_brackets.len();
            egui::CollapsingHeader::new(
                RichText::new(format!("Age Range  ({n_brackets}/{})", AgeBracket::ALL.len())).strong(),
            )
            .id_salt("age_ranges")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                for bracket in AgeBracket::ALL {
                    let mut checked = state.criteria.age_brackets.contains(&bracket);
                    if ui.checkbox(&mut checked, bracket.label()).changed() {
                        state.toggle_bracket(bracket);
                    }
                }
            });

            // ---- Elections counted by the participation view ----
            let n_selected = state.elections.len();
            egui::CollapsingHeader::new(
                RichText::new(format!("Elections  ({n_selected}/{})", elections.len())).strong(),
            )
            .id_salt("elections")
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                if elections.is_empty() {
                    ui.label("Extract has no election columns.");
                }
                for election in &elections {
                    let mut checked = state.elections.contains(election);
                    if ui.checkbox(&mut checked, election).changed() {
                        state.toggle_election(election);
                    }
                }
            });
        });
}

/// Collapsible checkbox list with All / None buttons.
fn multi_select(ui: &mut Ui, state: &mut AppState, title: &str, dim: Dimension) {
    let all_values = state.dimension_values(dim);
    let selected = match dim {
        Dimension::Race => &state.criteria.races,
        Dimension::Gender => &state.criteria.genders,
    };
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dim);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dim);
                }
            });

            for value in &all_values {
                let mut checked = match dim {
                    Dimension::Race => state.criteria.races.contains(value),
                    Dimension::Gender => state.criteria.genders.contains(value),
                };

                // Race entries carry their treemap colour.
                let mut text = RichText::new(value);
                if dim == Dimension::Race {
                    if let Some(colors) = &state.race_colors {
                        text = text.color(colors.color_for(value));
                    }
                }

                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_value(dim, value);
                }
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
            let can_export = state.views.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export summaries…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        if ui.button("Reload").clicked() {
            state.reload();
        }

        ui.separator();

        if let (Some(table), Some(views)) = (&state.table, &state.views) {
            ui.label(format!(
                "{} voters loaded, {} match  ·  {}",
                table.len(),
                views.filtered,
                table.source
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open voter extract")
        .add_filter("Voter extract", &["csv", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export summaries")
        .add_filter("JSON", &["json"])
        .set_file_name("voter_summaries.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_views(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
