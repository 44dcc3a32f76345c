use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::generate_palette;
use crate::data::aggregate::{ElectionHistogram, PivotTable};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Shared dense count table: Race | Gender | counts...
// ---------------------------------------------------------------------------

struct CountRow<'a> {
    race: &'a str,
    gender: &'a str,
    counts: Vec<usize>,
}

/// `footer`, when given, is rendered as a bold "Total" row under the body.
fn count_table(
    ui: &mut Ui,
    id: &str,
    count_headers: &[String],
    rows: Vec<CountRow<'_>>,
    footer: Option<Vec<usize>>,
) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .column(Column::auto().at_least(130.0))
            .column(Column::auto().at_least(60.0))
            .columns(Column::auto().at_least(48.0), count_headers.len())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("Race");
                });
                header.col(|ui: &mut Ui| {
                    ui.strong("Gender");
                });
                for h in count_headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for row in rows {
                    body.row(ROW_HEIGHT, |mut cells| {
                        cells.col(|ui: &mut Ui| {
                            ui.label(row.race);
                        });
                        cells.col(|ui: &mut Ui| {
                            ui.label(row.gender);
                        });
                        for n in &row.counts {
                            cells.col(|ui: &mut Ui| {
                                ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
                                    ui.label(n.to_string());
                                });
                            });
                        }
                    });
                }
                if let Some(totals) = &footer {
                    body.row(ROW_HEIGHT, |mut cells| {
                        cells.col(|ui: &mut Ui| {
                            ui.strong("Total");
                        });
                        cells.col(|_ui: &mut Ui| {});
                        for n in totals {
                            cells.col(|ui: &mut Ui| {
                                ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
                                    ui.strong(n.to_string());
                                });
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Pivot table
// ---------------------------------------------------------------------------

pub fn pivot_table(ui: &mut Ui, pivot: &PivotTable) {
    ui.heading("Voters by Race and Gender per Party");
    if pivot.rows.is_empty() {
        ui.label("No voters match the current filters.");
        return;
    }

    let mut headers = pivot.parties.clone();
    headers.push("Total".to_string());

    let rows = pivot
        .rows
        .iter()
        .map(|r| {
            let mut counts = r.counts.clone();
            counts.push(r.total);
            CountRow {
                race: &r.race,
                gender: &r.gender,
                counts,
            }
        })
        .collect();

    let mut footer: Vec<usize> = (0..pivot.parties.len())
        .map(|i| pivot.rows.iter().map(|r| r.counts[i]).sum())
        .collect();
    footer.push(pivot.grand_total());

    count_table(ui, "pivot_table", &headers, rows, Some(footer));
}

// ---------------------------------------------------------------------------
// Election participation
// ---------------------------------------------------------------------------

pub fn participation_table(ui: &mut Ui, histogram: &ElectionHistogram) {
    ui.heading(format!(
        "Elections Voted In (of {} selected)",
        histogram.elections.len()
    ));
    if histogram.elections.is_empty() {
        ui.label("No elections selected; every voter counts as 0.");
    }
    if histogram.rows.is_empty() {
        ui.label("No voters match the current filters.");
        return;
    }

    let mut headers: Vec<String> = (0..=histogram.elections.len()).map(|k| k.to_string()).collect();
    headers.push("Voters".to_string());
    let rows = histogram
        .rows
        .iter()
        .map(|r| {
            let mut counts = r.buckets.clone();
            counts.push(r.group_size());
            CountRow {
                race: &r.race,
                gender: &r.gender,
                counts,
            }
        })
        .collect();

    count_table(ui, "participation_table", &headers, rows, None);
    ui.add_space(8.0);
    participation_chart(ui, histogram);
}

/// Stacked bars: one series per (race, gender) group, x = elections voted in.
fn participation_chart(ui: &mut Ui, histogram: &ElectionHistogram) {
    let palette = generate_palette(histogram.rows.len());
    let mut charts: Vec<BarChart> = Vec::with_capacity(histogram.rows.len());

    for (row, color) in histogram.rows.iter().zip(palette) {
        let bars: Vec<Bar> = row
            .buckets
            .iter()
            .enumerate()
            .map(|(k, &n)| Bar::new(k as f64, n as f64).width(0.7))
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(format!("{} {}", row.race, row.gender))
            .color(color)
            .stack_on(&below);
        charts.push(chart);
    }

    Plot::new("participation_chart")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Elections voted in")
        .y_axis_label("Voters")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
