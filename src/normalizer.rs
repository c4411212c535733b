//! CSV ingestion for post-activity exports.
//!
//! Headers are matched case-insensitively against a short synonym list per
//! field, rows are split by position, and anything that does not yield a
//! valid date and non-negative count is dropped rather than failing the
//! whole file.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::dataset::{ActivityRecord, DatasetKind};
use crate::errors::HeatmapError;

/// Accepted spellings of the post URL column. `"ost url"` shows up in
/// exports whose first header byte was eaten.
pub const URL_COLUMNS: &[&str] = &["post url", "ost url", "url"];

pub const DATE_COLUMNS: &[&str] = &[
    "post publish date",
    "post published date",
    "published date",
    "date",
];

pub const ENGAGEMENT_COLUMNS: &[&str] = &["engagement", "engagements"];

pub const IMPRESSIONS_COLUMNS: &[&str] = &["impressions"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Synonym list for the value column of `kind`.
pub fn value_columns(kind: DatasetKind) -> &'static [&'static str] {
    match kind {
        DatasetKind::Engagement => ENGAGEMENT_COLUMNS,
        DatasetKind::Impressions => IMPRESSIONS_COLUMNS,
    }
}

/// Column positions of the three canonical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMap {
    pub url: usize,
    pub date: usize,
    pub value: usize,
}

impl HeaderMap {
    /// Resolves every canonical field against `headers`, which must already
    /// be trimmed and lower-cased.
    pub fn resolve(headers: &[String], kind: DatasetKind) -> Result<Self, HeatmapError> {
        Ok(Self {
            url: resolve_column(headers, "url", URL_COLUMNS)?,
            date: resolve_column(headers, "date", DATE_COLUMNS)?,
            value: resolve_column(headers, kind.as_str(), value_columns(kind))?,
        })
    }

    /// Minimum number of fields a data row needs.
    pub fn width(&self) -> usize {
        self.url.max(self.date).max(self.value) + 1
    }
}

/// The first synonym present in `headers` wins; its first occurrence is the
/// column used.
fn resolve_column(
    headers: &[String],
    field: &'static str,
    synonyms: &'static [&'static str],
) -> Result<usize, HeatmapError> {
    synonyms
        .iter()
        .find_map(|synonym| headers.iter().position(|h| h == synonym))
        .ok_or(HeatmapError::MissingColumn { field, synonyms })
}

/// Converts raw CSV text into activity records, preserving row order.
///
/// # Errors
///
/// [`HeatmapError::MissingColumn`] when the header lacks a field, and
/// [`HeatmapError::EmptyResult`] when no row survives validation.
pub fn normalize(raw: &str, kind: DatasetKind) -> Result<Vec<ActivityRecord>, HeatmapError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(raw.as_bytes());

    let mut lines = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        lines.push(record);
    }

    let mut lines = lines.into_iter();
    let headers: Vec<String> = lines
        .next()
        .map(|header| header.iter().map(|h| h.trim().to_lowercase()).collect())
        .unwrap_or_default();

    let columns = HeaderMap::resolve(&headers, kind)?;
    debug!(?columns, kind = %kind, "Resolved header columns");

    let mut records = Vec::new();
    let mut rows = 0usize;

    for fields in lines {
        rows += 1;
        let line = fields.position().map(|p| p.line()).unwrap_or_default();

        if fields.len() < columns.width() {
            warn!(line, fields = fields.len(), "Skipping line with insufficient data");
            continue;
        }

        let field = |idx: usize| fields.get(idx).map(str::trim).unwrap_or("");

        let Some(date) = parse_date(field(columns.date)) else {
            debug!(line, raw = field(columns.date), "Dropping row with invalid date");
            continue;
        };
        let Some(value) = parse_value(field(columns.value)) else {
            debug!(line, raw = field(columns.value), "Dropping row with invalid value");
            continue;
        };

        records.push(ActivityRecord {
            url: field(columns.url).to_string(),
            date,
            value,
        });
    }

    debug!(rows, kept = records.len(), kind = %kind, "Normalized CSV");

    if records.is_empty() {
        return Err(HeatmapError::EmptyResult);
    }

    Ok(records)
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|f| f.trim().is_empty())
}

/// Parses a calendar day, discarding any time-of-day component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Lenient integer parse: an optional `+`, then the leading run of digits.
/// Empty input counts as zero. No digits, a minus sign, or overflow yield
/// `None`.
pub fn parse_value(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }

    let unsigned = raw.strip_prefix('+').unwrap_or(raw);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    unsigned[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_engagement_row() {
        let csv = "Post URL,Post publish date,Engagement\nhttp://x,2024-08-29,13\n";
        let records = normalize(csv, DatasetKind::Engagement).unwrap();

        assert_eq!(
            records,
            vec![ActivityRecord {
                url: "http://x".to_string(),
                date: day(2024, 8, 29),
                value: 13,
            }]
        );
    }

    #[test]
    fn test_missing_impressions_column() {
        let csv = "Post URL,Date,Engagement\nhttp://x,2024-08-29,13\n";
        let err = normalize(csv, DatasetKind::Impressions).unwrap_err();

        match &err {
            HeatmapError::MissingColumn { field, .. } => assert_eq!(*field, "impressions"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("impressions"));
    }

    #[test]
    fn test_missing_url_column_names_all_synonyms() {
        let csv = "link,date,engagement\nhttp://x,2024-08-29,13\n";
        let err = normalize(csv, DatasetKind::Engagement).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required column: post url or ost url or url"
        );
    }

    #[test]
    fn test_empty_input_reports_missing_url() {
        let err = normalize("  \n\n", DatasetKind::Engagement).unwrap_err();
        assert!(matches!(err, HeatmapError::MissingColumn { field: "url", .. }));
    }

    #[test]
    fn test_empty_date_only_row_is_empty_result() {
        let csv = "Post URL,Post publish date,Engagement\nhttp://y,,5\n";
        let err = normalize(csv, DatasetKind::Engagement).unwrap_err();
        assert!(matches!(err, HeatmapError::EmptyResult));
    }

    #[test]
    fn test_synonym_priority_prefers_earlier_entry() {
        // "published date" outranks "date" even though "date" comes first.
        let csv = "url,date,published date,engagements\nhttp://a,2020-01-01,2024-03-05,7\n";
        let records = normalize(csv, DatasetKind::Engagement).unwrap();
        assert_eq!(records[0].date, day(2024, 3, 5));
    }

    #[test]
    fn test_misspelled_url_header_accepted() {
        let csv = "Ost URL,Date,Impressions\nhttp://a,2024-03-05,1200\n";
        let records = normalize(csv, DatasetKind::Impressions).unwrap();
        assert_eq!(records[0].url, "http://a");
        assert_eq!(records[0].value, 1200);
    }

    #[test]
    fn test_short_and_invalid_rows_are_skipped() {
        let csv = "\
Post URL,Post publish date,Engagement
http://a,2024-01-01,3

http://b,2024-01-02
http://c,not a date,4
http://d,2024-01-04,lots
   \t
http://e,2024-01-05,
http://f,2024-01-06,-2
";
        let records = normalize(csv, DatasetKind::Engagement).unwrap();
        let urls: Vec<_> = records.iter().map(|r| r.url.as_str()).collect();

        assert_eq!(urls, vec!["http://a", "http://e"]);
        assert_eq!(records[1].value, 0);
        assert!(records.len() <= 7);
    }

    #[test]
    fn test_headers_are_trimmed_and_case_insensitive() {
        let csv = "  POST URL , Post Published Date ,  ENGAGEMENTS \r\n http://a , 2024-02-29 , 42 \r\n";
        let records = normalize(csv, DatasetKind::Engagement).unwrap();
        assert_eq!(records[0].url, "http://a");
        assert_eq!(records[0].date, day(2024, 2, 29));
        assert_eq!(records[0].value, 42);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let csv = "url,date,impressions\nhttp://c,2024-03-01,3\nhttp://a,2024-01-01,1\nhttp://b,2024-02-01,2\n";
        let values: Vec<_> = normalize(csv, DatasetKind::Impressions)
            .unwrap()
            .into_iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn test_quotes_are_not_interpreted() {
        // Quote characters are kept verbatim.
        let csv = "url,date,engagement\n\"http://a\",2024-01-01,9\n";
        let records = normalize(csv, DatasetKind::Engagement).unwrap();
        assert_eq!(records[0].url, "\"http://a\"");
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-08-29"), Some(day(2024, 8, 29)));
        assert_eq!(parse_date("2024/08/29"), Some(day(2024, 8, 29)));
        assert_eq!(parse_date("8/29/2024"), Some(day(2024, 8, 29)));
        assert_eq!(parse_date("2024-08-29 23:15:00"), Some(day(2024, 8, 29)));
        assert_eq!(parse_date("2024-08-29T08:00:00.000"), Some(day(2024, 8, 29)));
        assert_eq!(parse_date("2024-08-29T08:00:00Z"), Some(day(2024, 8, 29)));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_parse_value_is_lenient_and_idempotent() {
        assert_eq!(parse_value(""), Some(0));
        assert_eq!(parse_value("13"), Some(13));
        assert_eq!(parse_value("13"), parse_value("13"));
        assert_eq!(parse_value("+7"), Some(7));
        assert_eq!(parse_value("12 likes"), Some(12));
        assert_eq!(parse_value("4.9"), Some(4));
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value("-5"), None);
        assert_eq!(parse_value("99999999999999999999999"), None);
    }

    #[test]
    fn test_header_map_width() {
        let headers: Vec<String> = ["impressions", "x", "date", "url"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = HeaderMap::resolve(&headers, DatasetKind::Impressions).unwrap();
        assert_eq!(map, HeaderMap { url: 3, date: 2, value: 0 });
        assert_eq!(map.width(), 4);
    }
}
