//! Scene types produced by the renderer.
//!
//! Coordinates are in pixels. Month grids are positioned relative to the
//! calendar origin and cells relative to their month grid, mirroring the
//! nested groups emitted as drawing commands.

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarCell;
use crate::color::Rgb;
use crate::dataset::DatasetKind;

/// Size of the drawing target supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Text shown while hovering an active day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    /// Localized day, e.g. `8/29/2024`.
    pub date: String,
    /// Capitalized dataset name.
    pub label: String,
    pub value: u64,
}

impl Tooltip {
    pub fn lines(&self) -> [String; 3] {
        [
            format!("Date: {}", self.date),
            format!("{}: {}", self.label, self.value),
            "Click to view post".to_string(),
        ]
    }
}

/// Hover and click behaviour of an active day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub tooltip: Tooltip,
    /// Post URL opened on click.
    pub link: String,
    /// Browsing context the link opens in.
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedCell {
    pub x: f64,
    pub y: f64,
    /// Drawn square edge, a little smaller than the grid pitch.
    pub size: f64,
    pub corner_radius: f64,
    pub cell: CalendarCell,
    pub interaction: Option<Interaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    /// Position in the 12-month window.
    pub index: usize,
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub x: f64,
    pub y: f64,
    pub title_x: f64,
    pub title_y: f64,
    pub cells: Vec<PlacedCell>,
}

impl MonthGrid {
    pub fn active_cells(&self) -> impl Iterator<Item = &PlacedCell> {
        self.cells.iter().filter(|c| c.cell.has_activity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub bar_height: f64,
    pub low: Rgb,
    pub high: Rgb,
    pub min_label: String,
    pub max_label: String,
    pub title: String,
    pub label_color: Rgb,
    pub title_color: Rgb,
}

/// A fully laid out heatmap for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub kind: DatasetKind,
    pub width: f64,
    /// Surface height after growing to fit the content.
    pub height: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell_size: f64,
    pub min_value: u64,
    pub max_value: u64,
    pub months: Vec<MonthGrid>,
    pub legend: Legend,
}

impl Heatmap {
    pub fn active_cells(&self) -> impl Iterator<Item = &PlacedCell> {
        self.months.iter().flat_map(|m| m.active_cells())
    }
}
