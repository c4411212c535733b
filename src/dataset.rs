//! Activity records and the pair of datasets (engagement, impressions) a
//! caller may hold at the same time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::errors::HeatmapError;
use crate::normalizer::normalize;

/// Which metric a CSV export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Engagement,
    Impressions,
}

impl DatasetKind {
    /// Lower-case name, as used in headers and file names.
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Engagement => "engagement",
            DatasetKind::Impressions => "impressions",
        }
    }

    /// Capitalized name shown in the legend and tooltips.
    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::Engagement => "Engagement",
            DatasetKind::Impressions => "Impressions",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "engagement" => Ok(DatasetKind::Engagement),
            "impressions" => Ok(DatasetKind::Impressions),
            other => Err(HeatmapError::Config(format!("unknown dataset kind '{other}'"))),
        }
    }
}

/// One post that survived normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub url: String,
    pub date: NaiveDate,
    pub value: u64,
}

/// Holds the most recently loaded records for each [`DatasetKind`] and which
/// one is currently selected for display.
///
/// A successful load replaces the previous records of that kind and selects
/// it. A failed load leaves everything untouched.
#[derive(Debug, Default)]
pub struct DatasetStore {
    engagement: Option<Vec<ActivityRecord>>,
    impressions: Option<Vec<ActivityRecord>>,
    active: Option<DatasetKind>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes `raw` as `kind` and stores the result.
    ///
    /// Returns the status message to show the user.
    pub fn load(&mut self, raw: &str, kind: DatasetKind) -> Result<String, HeatmapError> {
        info!(kind = %kind, "Processing {kind} file...");
        let records = match normalize(raw, kind) {
            Ok(records) => records,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Dataset load failed, keeping previous data");
                return Err(e);
            }
        };
        Ok(self.insert(kind, records))
    }

    /// Stores already-normalized records, e.g. the built-in sample.
    pub fn insert(&mut self, kind: DatasetKind, records: Vec<ActivityRecord>) -> String {
        let message = format!("Loaded {} posts for {kind}.", records.len());
        match kind {
            DatasetKind::Engagement => self.engagement = Some(records),
            DatasetKind::Impressions => self.impressions = Some(records),
        }
        self.active = Some(kind);
        info!(kind = %kind, "{message}");
        message
    }

    pub fn get(&self, kind: DatasetKind) -> Option<&[ActivityRecord]> {
        match kind {
            DatasetKind::Engagement => self.engagement.as_deref(),
            DatasetKind::Impressions => self.impressions.as_deref(),
        }
    }

    pub fn is_loaded(&self, kind: DatasetKind) -> bool {
        self.get(kind).is_some()
    }

    /// Switches the active dataset. Refused when `kind` has no records yet.
    pub fn select(&mut self, kind: DatasetKind) -> Result<(), HeatmapError> {
        if !self.is_loaded(kind) {
            return Err(HeatmapError::DatasetNotLoaded(kind));
        }
        self.active = Some(kind);
        Ok(())
    }

    pub fn active(&self) -> Option<DatasetKind> {
        self.active
    }

    /// The selected kind together with its records.
    pub fn active_records(&self) -> Option<(DatasetKind, &[ActivityRecord])> {
        let kind = self.active?;
        self.get(kind).map(|records| (kind, records))
    }
}

/// Five engagement records shown before the user supplies any file.
pub fn sample_engagement() -> Vec<ActivityRecord> {
    const SAMPLE: &[(&str, (i32, u32, u32), u64)] = &[
        (
            "https://www.linkedin.com/feed/update/urn:li:activity:7234908681555914754",
            (2024, 8, 29),
            13,
        ),
        (
            "https://www.linkedin.com/feed/update/urn:li:activity:7231650937415610368",
            (2024, 8, 20),
            15,
        ),
        (
            "https://www.linkedin.com/feed/update/urn:li:activity:7227310839307870210",
            (2024, 8, 8),
            31,
        ),
        (
            "https://www.linkedin.com/feed/update/urn:li:activity:7224422809379184640",
            (2024, 7, 31),
            88,
        ),
        (
            "https://www.linkedin.com/feed/update/urn:li:activity:7221909246836174849",
            (2024, 7, 24),
            21,
        ),
    ];

    SAMPLE
        .iter()
        .filter_map(|&(url, (y, m, d), value)| {
            Some(ActivityRecord {
                url: url.to_string(),
                date: NaiveDate::from_ymd_opt(y, m, d)?,
                value,
            })
        })
        .collect()
}
