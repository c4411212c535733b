//! Flat drawing instructions for presentation layers that paint imperatively.

use chrono::Datelike;
use serde::Serialize;

use super::types::{Heatmap, Interaction, Legend, MonthGrid, PlacedCell};
use crate::color::Rgb;

pub const LEGEND_GRADIENT_ID: &str = "value-gradient";

const DAY_FONT_SIZE: f64 = 12.0;
const TITLE_FONT_SIZE: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    Solid(Rgb),
    /// Reference to a gradient declared earlier by id.
    Gradient(String),
}

/// One drawing step. Groups translate everything up to the matching
/// [`DrawCommand::EndGroup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Remove all prior output and size the target.
    Clear { width: f64, height: f64 },
    BeginGroup {
        x: f64,
        y: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        interaction: Option<Interaction>,
    },
    EndGroup,
    LinearGradient { id: String, from: Rgb, to: Rgb },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Fill,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        anchor: TextAnchor,
        font_size: f64,
        bold: bool,
        fill: Option<Rgb>,
    },
}

impl Heatmap {
    /// Flattens the scene. The first command always clears the target.
    pub fn commands(&self) -> Vec<DrawCommand> {
        let mut out = vec![DrawCommand::Clear {
            width: self.width,
            height: self.height,
        }];

        out.push(DrawCommand::BeginGroup {
            x: self.origin_x,
            y: self.origin_y,
            interaction: None,
        });
        for month in &self.months {
            month_commands(month, self.cell_size, &mut out);
        }
        out.push(DrawCommand::EndGroup);

        legend_commands(&self.legend, &mut out);
        out
    }
}

fn month_commands(month: &MonthGrid, cell_size: f64, out: &mut Vec<DrawCommand>) {
    out.push(DrawCommand::BeginGroup {
        x: month.x,
        y: month.y,
        interaction: None,
    });
    out.push(DrawCommand::Text {
        x: month.title_x,
        y: month.title_y,
        text: month.title.clone(),
        anchor: TextAnchor::Middle,
        font_size: TITLE_FONT_SIZE,
        bold: true,
        fill: None,
    });
    for placed in &month.cells {
        cell_commands(placed, cell_size, out);
    }
    out.push(DrawCommand::EndGroup);
}

fn cell_commands(placed: &PlacedCell, cell_size: f64, out: &mut Vec<DrawCommand>) {
    out.push(DrawCommand::BeginGroup {
        x: placed.x,
        y: placed.y,
        interaction: placed.interaction.clone(),
    });
    out.push(DrawCommand::Rect {
        x: 0.0,
        y: 0.0,
        width: placed.size,
        height: placed.size,
        radius: placed.corner_radius,
        fill: Fill::Solid(placed.cell.fill),
    });
    if let Some(date) = placed.cell.date {
        out.push(DrawCommand::Text {
            x: cell_size / 2.0,
            y: cell_size / 2.0,
            text: date.day().to_string(),
            anchor: TextAnchor::Middle,
            font_size: DAY_FONT_SIZE,
            bold: false,
            fill: Some(placed.cell.text_color),
        });
    }
    out.push(DrawCommand::EndGroup);
}

fn legend_commands(legend: &Legend, out: &mut Vec<DrawCommand>) {
    out.push(DrawCommand::BeginGroup {
        x: legend.x,
        y: legend.y,
        interaction: None,
    });
    out.push(DrawCommand::LinearGradient {
        id: LEGEND_GRADIENT_ID.to_string(),
        from: legend.low,
        to: legend.high,
    });
    out.push(DrawCommand::Rect {
        x: 0.0,
        y: 0.0,
        width: legend.width,
        height: legend.bar_height,
        radius: legend.bar_height / 2.0,
        fill: Fill::Gradient(LEGEND_GRADIENT_ID.to_string()),
    });
    out.push(DrawCommand::Text {
        x: -5.0,
        y: 20.0,
        text: legend.min_label.clone(),
        anchor: TextAnchor::End,
        font_size: DAY_FONT_SIZE,
        bold: false,
        fill: Some(legend.label_color),
    });
    out.push(DrawCommand::Text {
        x: legend.width + 5.0,
        y: 20.0,
        text: legend.max_label.clone(),
        anchor: TextAnchor::Start,
        font_size: DAY_FONT_SIZE,
        bold: false,
        fill: Some(legend.label_color),
    });
    out.push(DrawCommand::Text {
        x: legend.width / 2.0,
        y: -10.0,
        text: legend.title.clone(),
        anchor: TextAnchor::Middle,
        font_size: TITLE_FONT_SIZE,
        bold: true,
        fill: Some(legend.title_color),
    });
    out.push(DrawCommand::EndGroup);
}
