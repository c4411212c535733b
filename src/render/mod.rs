//! Calendar heatmap layout.
//!
//! [`render`] turns a dataset into a [`Heatmap`] scene: twelve positioned
//! month grids whose active days are shaded by a [`ColorScale`], plus a
//! gradient legend. The scene can be flattened into [`DrawCommand`]s or
//! written out as an SVG document.

pub mod commands;
pub mod svg;
pub mod types;

pub use commands::{DrawCommand, Fill, TextAnchor};
pub use types::{Heatmap, Interaction, Legend, MonthGrid, PlacedCell, Surface, Tooltip};

use tracing::{debug, info};

use crate::calendar::{CalendarCell, MonthInfo, month_cells};
use crate::color::ColorScale;
use crate::config::HeatmapConfig;
use crate::dataset::{ActivityRecord, DatasetKind};
use crate::errors::HeatmapError;

/// Vertical gap between a month title and its first week row.
const TITLE_GAP: f64 = 20.0;
const CELL_INSET: f64 = 2.0;
const CELL_RADIUS: f64 = 2.0;
const LINK_TARGET: &str = "_blank";

/// Lays out `records` on the configured 12-month calendar.
///
/// The output depends only on the arguments; calling it again with the same
/// inputs yields an identical scene.
///
/// # Errors
///
/// [`HeatmapError::NoRecords`] for an empty dataset,
/// [`HeatmapError::InvalidSurface`] for a zero-size surface, and
/// [`HeatmapError::Config`] for an invalid configuration.
pub fn render(
    records: &[ActivityRecord],
    surface: Surface,
    kind: DatasetKind,
    config: &HeatmapConfig,
) -> Result<Heatmap, HeatmapError> {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(surface.width) || !usable(surface.height) {
        return Err(HeatmapError::InvalidSurface {
            width: surface.width,
            height: surface.height,
        });
    }
    config.validate()?;

    let layout = &config.layout;
    let palette = &config.palette;

    let scale = ColorScale::from_values(records.iter().map(|r| r.value), palette.low, palette.high)
        .ok_or(HeatmapError::NoRecords)?;
    debug!(min = scale.min(), max = scale.max(), "Built color scale");

    let months = config.window.months()?;

    let x_offset = (surface.width - layout.calendar_width()) / 2.0;
    let origin_x = layout.margin_left + x_offset;
    let origin_y = layout.margin_top;

    let grids: Vec<MonthGrid> = months
        .iter()
        .enumerate()
        .map(|(index, month)| month_grid(index, month, records, &scale, kind, config))
        .collect();

    let calendar_height = layout.calendar_height(grids.len());
    let height = surface.height.max(layout.content_height(grids.len()));

    let legend = Legend {
        x: surface.width / 2.0 - layout.legend_width / 2.0,
        y: layout.margin_top + calendar_height + layout.legend_spacing,
        width: layout.legend_width,
        bar_height: layout.legend_bar_height,
        low: scale.color(scale.min()),
        high: scale.color(scale.max()),
        min_label: scale.min().to_string(),
        max_label: scale.max().to_string(),
        title: kind.label().to_string(),
        label_color: palette.legend_label,
        title_color: palette.legend_title,
    };

    let heatmap = Heatmap {
        kind,
        width: surface.width,
        height,
        origin_x,
        origin_y,
        cell_size: layout.cell_size,
        min_value: scale.min(),
        max_value: scale.max(),
        months: grids,
        legend,
    };

    info!(
        kind = %kind,
        records = records.len(),
        active_days = heatmap.active_cells().count(),
        width = heatmap.width,
        height = heatmap.height,
        "Rendered heatmap"
    );

    Ok(heatmap)
}

fn month_grid(
    index: usize,
    month: &MonthInfo,
    records: &[ActivityRecord],
    scale: &ColorScale,
    kind: DatasetKind,
    config: &HeatmapConfig,
) -> MonthGrid {
    let layout = &config.layout;
    let palette = &config.palette;
    let cell = layout.cell_size;
    let per_row = layout.months_per_row;

    let cells = month_cells(
        month,
        records,
        (palette.empty_fill, palette.empty_text),
        |value| {
            let fill = scale.color(value);
            (fill, fill.darker(palette.text_darken))
        },
    );

    let cells = cells
        .into_iter()
        .enumerate()
        .map(|(slot, c)| PlacedCell {
            x: (slot % 7) as f64 * cell,
            y: (slot / 7) as f64 * cell + layout.month_label_height + TITLE_GAP,
            size: cell - CELL_INSET,
            corner_radius: CELL_RADIUS,
            interaction: interaction(&c, kind),
            cell: c,
        })
        .collect();

    MonthGrid {
        index,
        year: month.year,
        month: month.month,
        title: month.title(),
        x: (index % per_row) as f64 * layout.month_width(),
        y: (index / per_row) as f64 * layout.month_height(),
        title_x: cell * 3.5,
        title_y: layout.month_label_height,
        cells,
    }
}

fn interaction(cell: &CalendarCell, kind: DatasetKind) -> Option<Interaction> {
    if !cell.has_activity {
        return None;
    }
    let date = cell.date?;
    let value = cell.value?;

    Some(Interaction {
        tooltip: Tooltip {
            date: date.format("%-m/%-d/%Y").to_string(),
            label: kind.label().to_string(),
            value,
        },
        link: cell.url.clone().unwrap_or_default(),
        target: LINK_TARGET.to_string(),
    })
}
