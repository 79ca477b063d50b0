use std::collections::HashMap;

use eframe::egui::{Align2, Color32, FontId, Rect, Sense, Ui, Vec2};

use crate::color::ColorScale;

/// Grid placement of each state as (abbreviation, row, column).
pub const TILES: [(&str, u8, u8); 51] = [
    ("AK", 0, 0),
    ("ME", 0, 11),
    ("VT", 1, 10),
    ("NH", 1, 11),
    ("WA", 2, 1),
    ("ID", 2, 2),
    ("MT", 2, 3),
    ("ND", 2, 4),
    ("MN", 2, 5),
    ("IL", 2, 6),
    ("WI", 2, 7),
    ("MI", 2, 8),
    ("NY", 2, 9),
    ("RI", 2, 10),
    ("MA", 2, 11),
    ("OR", 3, 1),
    ("NV", 3, 2),
    ("WY", 3, 3),
    ("SD", 3, 4),
    ("IA", 3, 5),
    ("IN", 3, 6),
    ("OH", 3, 7),
    ("PA", 3, 8),
    ("NJ", 3, 9),
    ("CT", 3, 10),
    ("CA", 4, 1),
    ("UT", 4, 2),
    ("CO", 4, 3),
    ("NE", 4, 4),
    ("MO", 4, 5),
    ("KY", 4, 6),
    ("WV", 4, 7),
    ("VA", 4, 8),
    ("MD", 4, 9),
    ("DE", 4, 10),
    ("AZ", 5, 2),
    ("NM", 5, 3),
    ("KS", 5, 4),
    ("AR", 5, 5),
    ("TN", 5, 6),
    ("NC", 5, 7),
    ("SC", 5, 8),
    ("DC", 5, 9),
    ("OK", 6, 4),
    ("LA", 6, 5),
    ("MS", 6, 6),
    ("AL", 6, 7),
    ("GA", 6, 8),
    ("HI", 7, 0),
    ("TX", 7, 4),
    ("FL", 7, 9),
];

const GRID_COLUMNS: f32 = 12.0;
const GRID_ROWS: f32 = 8.0;
const NO_DATA: Color32 = Color32::from_gray(60);

/// Value and hover text for one state.
pub struct TileValue {
    pub value: Option<f64>,
    pub tooltip: String,
}

fn text_color(fill: Color32) -> Color32 {
    let luma = 0.299 * fill.r() as f32 + 0.587 * fill.g() as f32 + 0.114 * fill.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

/// Draw a tile-grid choropleth. States missing from `values` are grey.
pub fn tile_map(
    ui: &mut Ui,
    id_salt: &str,
    values: &HashMap<String, TileValue>,
    scale: Option<&ColorScale>,
) {
    let cell = (ui.available_width() / GRID_COLUMNS).clamp(24.0, 48.0);
    let (area, _) = ui.allocate_exact_size(
        Vec2::new(cell * GRID_COLUMNS, cell * GRID_ROWS),
        Sense::hover(),
    );
    let painter = ui.painter_at(area);

    for (abbr, row, col) in TILES {
        let min = area.min + Vec2::new(col as f32 * cell, row as f32 * cell);
        let tile = Rect::from_min_size(min, Vec2::splat(cell - 2.0));
        let entry = values.get(abbr);
        let fill = match (entry.and_then(|e| e.value), scale) {
            (Some(v), Some(scale)) => scale.color_for(v),
            _ => NO_DATA,
        };

        painter.rect_filled(tile, 2.0, fill);
        painter.text(
            tile.center(),
            Align2::CENTER_CENTER,
            abbr,
            FontId::proportional(cell * 0.3),
            text_color(fill),
        );

        let hover = entry.map_or_else(|| format!("{abbr}: no data"), |e| e.tooltip.clone());
        ui.interact(tile, ui.id().with((id_salt, abbr)), Sense::hover())
            .on_hover_text(hover);
    }
}
