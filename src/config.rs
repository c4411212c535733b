//! Rendering configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//! ```json
//! {
//!   "window": { "start_year": 2024, "start_month": 9 },
//!   "palette": { "high": "#0a66c2" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarWindow;
use crate::color::Rgb;
use crate::errors::HeatmapError;

/// Grid geometry in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub cell_size: f64,
    pub month_label_height: f64,
    /// Minimum gap between neighbouring months.
    pub month_margin: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub legend_spacing: f64,
    pub legend_width: f64,
    pub legend_bar_height: f64,
    /// Approximate height of the legend block including its labels.
    pub legend_height: f64,
    pub months_per_row: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            cell_size: 30.0,
            month_label_height: 20.0,
            month_margin: 50.0,
            margin_top: 40.0,
            margin_right: 40.0,
            margin_bottom: 80.0,
            margin_left: 40.0,
            legend_spacing: 30.0,
            legend_width: 300.0,
            legend_bar_height: 8.0,
            legend_height: 50.0,
            months_per_row: 4,
        }
    }
}

impl Layout {
    /// Seven day columns plus the gap to the next month.
    pub fn month_width(&self) -> f64 {
        self.cell_size * 7.0 + self.month_margin
    }

    /// Six week rows, the month title and the gap below.
    pub fn month_height(&self) -> f64 {
        self.cell_size * 6.0 + self.month_label_height + self.month_margin
    }

    pub fn calendar_width(&self) -> f64 {
        self.month_width() * self.months_per_row as f64
    }

    pub fn rows(&self, months: usize) -> usize {
        months.div_ceil(self.months_per_row)
    }

    pub fn calendar_height(&self, months: usize) -> f64 {
        self.month_height() * self.rows(months) as f64
    }

    /// Height needed for the calendar block, legend and margins.
    pub fn content_height(&self, months: usize) -> f64 {
        self.margin_top
            + self.calendar_height(months)
            + self.legend_spacing
            + self.legend_height
            + self.margin_bottom
    }

    fn validate(&self) -> Result<(), HeatmapError> {
        if !(self.cell_size.is_finite() && self.cell_size > 2.0) {
            return Err(HeatmapError::Config(format!(
                "cell_size must be greater than 2, got {}",
                self.cell_size
            )));
        }
        if self.months_per_row == 0 {
            return Err(HeatmapError::Config("months_per_row must be at least 1".into()));
        }
        Ok(())
    }
}

/// Colors used for cells, text and the legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Color of the smallest observed value.
    pub low: Rgb,
    /// Color of the largest observed value.
    pub high: Rgb,
    pub empty_fill: Rgb,
    pub empty_text: Rgb,
    /// `darker()` exponent applied to an active fill to get its day label color.
    pub text_darken: f64,
    pub legend_label: Rgb,
    pub legend_title: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            low: Rgb::new(232.0, 243.0, 236.0),
            high: Rgb::new(52.0, 199.0, 89.0),
            empty_fill: Rgb::new(245.0, 245.0, 247.0),
            empty_text: Rgb::new(142.0, 142.0, 147.0),
            text_darken: 2.0,
            legend_label: Rgb::new(142.0, 142.0, 147.0),
            legend_title: Rgb::new(29.0, 29.0, 31.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    pub layout: Layout,
    pub palette: Palette,
    pub window: CalendarWindow,
}

impl HeatmapConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{path}'"))?;
        let config: HeatmapConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HeatmapError> {
        self.layout.validate()?;
        self.window.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_default_layout_dimensions() {
        let layout = Layout::default();
        assert_eq!(layout.month_width(), 260.0);
        assert_eq!(layout.month_height(), 250.0);
        assert_eq!(layout.calendar_width(), 1040.0);
        assert_eq!(layout.rows(12), 3);
        assert_eq!(layout.calendar_height(12), 750.0);
        assert_eq!(layout.content_height(12), 950.0);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let path = temp_path("post_heatmap_test_partial_config.json");
        fs::write(
            &path,
            r##"{"window": {"start_year": 2024}, "palette": {"high": "#0a66c2"}}"##,
        )
        .unwrap();

        let config = HeatmapConfig::load(&path).unwrap();
        assert_eq!(config.window.start_year, 2024);
        assert_eq!(config.window.start_month, 9);
        assert_eq!(config.palette.high.to_hex(), "#0a66c2");
        assert_eq!(config.palette.low, Palette::default().low);
        assert_eq!(config.layout, Layout::default());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let path = temp_path("post_heatmap_test_bad_config.json");
        fs::write(&path, r#"{"window": {"start_month": 0}}"#).unwrap();
        assert!(HeatmapConfig::load(&path).is_err());

        fs::write(&path, r#"{"layout": {"cell_size": 1}}"#).unwrap();
        assert!(HeatmapConfig::load(&path).is_err());

        fs::write(&path, r#"{"palette": {"low": "green"}}"#).unwrap();
        assert!(HeatmapConfig::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_config_file_is_error() {
        assert!(HeatmapConfig::load("/nonexistent/post_heatmap.json").is_err());
    }
}
