//! Output formatting and persistence for normalized records and rendered heatmaps.
//!
//! Supports pretty-printing, JSON drawing commands, normalized CSV and SVG.

use anyhow::Result;
use tracing::{debug, info};

use crate::dataset::ActivityRecord;
use crate::render::{Heatmap, svg};
use csv::WriterBuilder;
use std::fs;
use std::path::Path;

/// Logs records using Rust's debug pretty-print format.
pub fn print_pretty(records: &[ActivityRecord]) {
    debug!("{:#?}", records);
}

/// Logs a short summary of a normalized dataset: row count, date span and value range.
pub fn print_summary(records: &[ActivityRecord]) {
    let first = records.iter().map(|r| r.date).min();
    let last = records.iter().map(|r| r.date).max();
    let min = records.iter().map(|r| r.value).min();
    let max = records.iter().map(|r| r.value).max();
    let total: u64 = records.iter().map(|r| r.value).sum();

    info!(
        posts = records.len(),
        first = ?first,
        last = ?last,
        min = ?min,
        max = ?max,
        total,
        "Dataset summary"
    );
}

/// Writes records as CSV with `url,date,value` headers, replacing any existing file.
pub fn write_records(path: &str, records: &[ActivityRecord]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path, rows = records.len(), "Wrote normalized records");
    Ok(())
}

/// Writes the drawing commands as pretty-printed JSON.
pub fn write_commands(path: &str, heatmap: &Heatmap) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(&heatmap.commands())?;
    fs::write(path, json)?;

    debug!(path, "Wrote drawing commands");
    Ok(())
}

/// Writes the heatmap as an SVG document.
pub fn write_svg(path: &str, heatmap: &Heatmap) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, svg::to_svg(heatmap))?;

    debug!(path, "Wrote SVG");
    Ok(())
}

fn ensure_parent(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
