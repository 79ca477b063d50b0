use std::collections::{BTreeSet, HashMap};

use eframe::egui::{Align2, Color32, FontId, Rect, Sense, Ui, Vec2};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::{ColorScale, Scheme};
use crate::data::aggregate::{EmployerWage, LevelStateWage, StateWage, Summary};
use crate::state::{AppState, View};
use crate::ui::tile_map::{TILES, TileValue, tile_map};

/// Heatmap colour midpoint (annual wage).
const HEATMAP_MID: f64 = 1e5;

/// `1234567.8` → `"1,234,568"`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

fn format_mean(mean: Option<f64>) -> String {
    mean.map_or_else(|| "n/a".to_string(), format_thousands)
}

/// Render every chart for the current view; nothing unless a summary exists.
pub fn all_charts(ui: &mut Ui, state: &AppState) {
    let View::Ready { summary, .. } = &state.view else {
        return;
    };
    state_maps(ui, summary);
    ui.separator();
    employer_chart(ui, &summary.employers);
    ui.separator();
    wage_level_heatmap(ui, &summary.levels);
}

// ---------------------------------------------------------------------------
// Choropleth by worksite state
// ---------------------------------------------------------------------------

/// Tooltip shared by both maps.
pub fn state_tooltip(row: &StateWage) -> String {
    let name = row
        .region
        .as_ref()
        .map_or(row.state.as_str(), |r| r.name.as_str());
    format!(
        "State: {name}\nAvg Salary: {}\nCount: {}",
        format_mean(row.stats.mean),
        format_thousands(row.stats.count as f64)
    )
}

fn state_maps(ui: &mut Ui, summary: &Summary) {
    let variables: [(&str, fn(&StateWage) -> Option<f64>); 2] = [
        ("AVG_SALARY", |r| r.stats.mean),
        ("COUNT", |r| Some(r.stats.count as f64)),
    ];

    for (title, value_of) in variables {
        ui.strong(title);
        let values: HashMap<String, TileValue> = summary
            .states
            .iter()
            .map(|row| {
                (
                    row.state.clone(),
                    TileValue {
                        value: value_of(row),
                        tooltip: state_tooltip(row),
                    },
                )
            })
            .collect();
        // Each map gets its own colour domain.
        let scale = ColorScale::from_values(
            Scheme::Blues,
            summary.states.iter().filter_map(value_of),
        );
        tile_map(ui, title, &values, scale.as_ref());

        let off_grid: Vec<&str> = summary
            .states
            .iter()
            .map(|r| r.state.as_str())
            .filter(|s| !on_grid(s))
            .collect();
        if !off_grid.is_empty() {
            ui.small(format!("Not on map: {}", off_grid.join(", ")));
        }
        ui.add_space(6.0);
    }
}

fn on_grid(abbr: &str) -> bool {
    TILES.iter().any(|(a, _, _)| *a == abbr)
}

// ---------------------------------------------------------------------------
// Top employers bar chart
// ---------------------------------------------------------------------------

fn employer_chart(ui: &mut Ui, employers: &[EmployerWage]) {
    ui.strong("H1B Visa Data by Employer");
    if employers.is_empty() {
        ui.label("No employer data");
        return;
    }

    let scale = ColorScale::from_values(
        Scheme::Blues,
        employers.iter().filter_map(|e| e.stats.mean),
    );
    let n = employers.len();
    // Largest count at the top.
    let bars: Vec<Bar> = employers
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let fill = scale.map_or(Color32::LIGHT_BLUE, |s| s.color_or_missing(e.stats.mean));
            Bar::new((n - 1 - i) as f64, e.stats.count as f64)
                .name(&e.employer)
                .fill(fill)
                .width(0.8)
        })
        .collect();

    let tooltips: Vec<String> = employers
        .iter()
        .map(|e| {
            format!(
                "Employer: {}\nCount: {}\nAvg Salary: {}",
                e.employer,
                e.stats.count,
                format_mean(e.stats.mean)
            )
        })
        .collect();
    let chart = BarChart::new(bars)
        .horizontal()
        .element_formatter(Box::new(move |bar, _chart| {
            (n - 1)
                .checked_sub(bar.argument.round() as usize)
                .and_then(|i| tooltips.get(i).cloned())
                .unwrap_or_default()
        }));

    let names: Vec<String> = employers.iter().map(|e| e.employer.clone()).collect();
    Plot::new("employers")
        .height(24.0 * n as f32 + 40.0)
        .x_axis_label("Count")
        .y_axis_formatter(move |mark, _range| {
            let pos = mark.value;
            if pos.fract() != 0.0 || pos < 0.0 {
                return String::new();
            }
            let i = pos as usize;
            if i >= n {
                return String::new();
            }
            names[n - 1 - i].clone()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

// ---------------------------------------------------------------------------
// Wage level × state heatmap
// ---------------------------------------------------------------------------

/// Sorted wage levels (x axis) and states (y axis) present in `cells`.
pub fn heatmap_axes(cells: &[LevelStateWage]) -> (Vec<&str>, Vec<&str>) {
    let levels: BTreeSet<&str> = cells.iter().map(|c| c.wage_level.as_str()).collect();
    let states: BTreeSet<&str> = cells.iter().map(|c| c.state.as_str()).collect();
    (levels.into_iter().collect(), states.into_iter().collect())
}

fn wage_level_heatmap(ui: &mut Ui, cells: &[LevelStateWage]) {
    ui.strong("H1B Visa Average Salary by Wage Level and Worksite State");

    let (levels, states) = heatmap_axes(cells);
    let scale = ColorScale::from_values(
        Scheme::RedBlue { mid: HEATMAP_MID },
        cells.iter().filter_map(|c| c.stats.mean),
    );
    let lookup: HashMap<(&str, &str), &LevelStateWage> = cells
        .iter()
        .map(|c| ((c.wage_level.as_str(), c.state.as_str()), c))
        .collect();

    let label_w = 40.0;
    let header_h = 20.0;
    let cell = Vec2::new(70.0, 16.0);
    let size = Vec2::new(
        label_w + cell.x * levels.len() as f32,
        header_h + cell.y * states.len() as f32,
    );
    let (area, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(area);
    let font = FontId::proportional(11.0);
    let text = ui.visuals().text_color();

    for (x, level) in levels.iter().enumerate() {
        let center = area.min + Vec2::new(label_w + cell.x * (x as f32 + 0.5), header_h * 0.5);
        painter.text(center, Align2::CENTER_CENTER, *level, font.clone(), text);
    }

    for (y, state) in states.iter().enumerate() {
        let top = header_h + cell.y * y as f32;
        painter.text(
            area.min + Vec2::new(label_w - 4.0, top + cell.y * 0.5),
            Align2::RIGHT_CENTER,
            *state,
            font.clone(),
            text,
        );

        for (x, level) in levels.iter().enumerate() {
            let Some(entry) = lookup.get(&(*level, *state)) else {
                continue;
            };
            let min = area.min + Vec2::new(label_w + cell.x * x as f32, top);
            let rect = Rect::from_min_size(min, cell - Vec2::splat(1.0));
            let fill = scale.map_or(Color32::GRAY, |s| s.color_or_missing(entry.stats.mean));
            painter.rect_filled(rect, 0.0, fill);

            ui.interact(rect, ui.id().with(("heatmap", *level, *state)), Sense::hover())
                .on_hover_text(format!(
                    "PW Wage Level: {level}\nWorksite State: {state}\nAvg Salary: {}\nCount: {}",
                    format_mean(entry.stats.mean),
                    format_thousands(entry.stats.count as f64)
                ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::WageStats;
    use crate::data::reference::StateRegion;

    #[test]
    fn thousands_separator() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1_000.0), "1,000");
        assert_eq!(format_thousands(1_234_567.8), "1,234,568");
        assert_eq!(format_thousands(-12_345.0), "-12,345");
        assert_eq!(format_mean(None), "n/a");
    }

    #[test]
    fn tooltip_prefers_reference_name() {
        let mut row = StateWage {
            state: "TX".into(),
            stats: WageStats {
                mean: Some(123_456.0),
                count: 1_200,
            },
            region: Some(StateRegion {
                name: "Texas".into(),
                abbreviation: "TX".into(),
                id: 48,
            }),
        };
        assert_eq!(
            state_tooltip(&row),
            "State: Texas\nAvg Salary: 123,456\nCount: 1,200"
        );
        row.region = None;
        assert!(state_tooltip(&row).starts_with("State: TX\n"));
    }

    #[test]
    fn heatmap_axes_are_sorted_and_distinct() {
        let cell = |level: &str, state: &str| LevelStateWage {
            wage_level: level.into(),
            state: state.into(),
            stats: WageStats::default(),
        };
        let cells = vec![
            cell("Unknown", "TX"),
            cell("II", "CA"),
            cell("I", "TX"),
            cell("II", "TX"),
        ];
        let (levels, states) = heatmap_axes(&cells);
        assert_eq!(levels, vec!["I", "II", "Unknown"]);
        assert_eq!(states, vec!["CA", "TX"]);
    }
}
