use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::{Column, Dataset};
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;
const TABLE_HEIGHT: f32 = 320.0;

/// Filtered records with every projected column.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let rows = state.visible_rows();

    ui.label(format!("Filtered H1B Data: {} rows", rows.len()));

    egui::ScrollArea::horizontal()
        .id_salt("records_scroll")
        .show(ui, |ui: &mut Ui| {
            ui.push_id("records", |ui: &mut Ui| table(ui, dataset, rows));
        });
}

fn table(ui: &mut Ui, dataset: &Dataset, rows: &[usize]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .min_scrolled_height(0.0)
        .max_scroll_height(TABLE_HEIGHT)
        .columns(TableColumn::auto().at_least(60.0).clip(true), Column::ALL.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for column in Column::ALL {
                header.col(|ui: &mut Ui| {
                    ui.strong(column.name());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let record = &dataset.records[rows[row.index()]];
                for column in Column::ALL {
                    row.col(|ui: &mut Ui| {
                        ui.label(record.display(column));
                    });
                }
            });
        });
}
