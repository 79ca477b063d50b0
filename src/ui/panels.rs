use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::MULTI_SELECT_COLUMNS;
use crate::data::model::Column;
use crate::state::{AppState, View};

const DOL_URL: &str = "https://www.dol.gov/agencies/eta/foreign-labor/performance";

/// Sidebar label for a multi-select column.
pub fn column_label(column: Column) -> &'static str {
    match column {
        Column::SocTitle => "SOC Title",
        Column::EmployerName => "Employer",
        Column::WorksiteCity => "Worksite City",
        Column::WorksiteState => "Worksite State",
        other => other.name(),
    }
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    // ---- Year selector ----
    ui.strong("Select Year");
    let mut chosen_year = None;
    egui::ComboBox::from_id_salt("year")
        .selected_text(state.selected_year.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for &year in &state.config.years {
                if ui
                    .selectable_label(state.selected_year == year, year.to_string())
                    .clicked()
                {
                    chosen_year = Some(year);
                }
            }
        });
    if let Some(year) = chosen_year.filter(|y| *y != state.selected_year) {
        state.load_year(year);
    }
    ui.add_space(6.0);

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // ---- Job title ----
    ui.strong("Select Job Title");
    let mut text = state.criteria.job_title.clone();
    if ui.text_edit_singleline(&mut text).changed() {
        state.set_job_title(text);
    }
    ui.add_space(6.0);

    // ---- Multi-selects (collapsible) ----
    let mut toggled: Option<(Column, String)> = None;
    let mut cleared: Option<Column> = None;

    ScrollArea::vertical()
        .id_salt("filters")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for column in MULTI_SELECT_COLUMNS {
                let Some(values) = state.options.get(&column) else {
                    continue;
                };
                let n_selected = state.criteria.selection(column).map_or(0, |s| s.len());
                let header_text = format!(
                    "Select {}  ({n_selected}/{})",
                    column_label(column),
                    values.len()
                );

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column.name())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if n_selected > 0 && ui.small_button("Clear").clicked() {
                            cleared = Some(column);
                        }

                        // Values the user picked stay visible even if the
                        // current options no longer contain them.
                        let stale: Vec<&String> = state
                            .criteria
                            .selection(column)
                            .map(|s| s.iter().filter(|v| !values.contains(*v)).collect())
                            .unwrap_or_default();
                        for value in stale {
                            let mut checked = true;
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                toggled = Some((column, value.clone()));
                            }
                        }

                        let values: Vec<&String> = values.iter().collect();
                        ScrollArea::vertical()
                            .id_salt(column.name())
                            .max_height(220.0)
                            .show_rows(ui, 18.0, values.len(), |ui: &mut Ui, range| {
                                for value in &values[range] {
                                    let mut checked = state.criteria.is_selected(column, value);
                                    if ui.checkbox(&mut checked, value.as_str()).changed() {
                                        toggled = Some((column, (*value).clone()));
                                    }
                                }
                            });
                    });
            }
        });

    if let Some(column) = cleared {
        state.clear_selection(column);
    }
    if let Some((column, value)) = toggled {
        state.toggle_selection(column, &value);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload data").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let partitions: Vec<String> = ds
                .partitions
                .iter()
                .map(|p| format!("{}: {} rows", p.partition, p.rows))
                .collect();
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_rows().len()
            ))
            .on_hover_text(partitions.join("\n"));

            let quarantined = ds.quarantined();
            if quarantined > 0 {
                ui.label(
                    RichText::new(format!("{quarantined} rows quarantined"))
                        .color(Color32::YELLOW),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel framing
// ---------------------------------------------------------------------------

/// Title and data source link.
pub fn header(ui: &mut Ui) {
    ui.heading("H1B Visa Data Dashboard");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("This dashboard visualizes H1B visa data from");
        ui.hyperlink_to("US Department of Labor LCA Data", DOL_URL);
    });
    ui.add_space(8.0);
}

/// Show the message for views without data. Returns `true` when there is
/// nothing else to render.
pub fn view_message(ui: &mut Ui, state: &AppState) -> bool {
    match &state.view {
        View::Unavailable(msg) => {
            ui.label(RichText::new(msg).color(Color32::RED));
            true
        }
        View::NoData => {
            ui.label("No data");
            true
        }
        View::Failed { error, .. } => {
            ui.label(RichText::new(format!("Charts unavailable: {error}")).color(Color32::RED));
            false
        }
        View::Ready { .. } => false,
    }
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open LCA data folder")
        .set_directory(state.store.data_dir())
        .pick_folder();

    if let Some(path) = folder {
        state.set_data_dir(path);
    }
}
