//! Calendar math for the fixed 12-month display window.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::dataset::ActivityRecord;
use crate::errors::HeatmapError;

pub const MONTHS_IN_WINDOW: usize = 12;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The first month shown. The window always spans the twelve months from
/// here, regardless of which dates the data covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarWindow {
    pub start_year: i32,
    /// 1 = January.
    pub start_month: u32,
}

impl Default for CalendarWindow {
    fn default() -> Self {
        Self {
            start_year: 2023,
            start_month: 9,
        }
    }
}

impl CalendarWindow {
    pub fn validate(&self) -> Result<(), HeatmapError> {
        if !(1..=12).contains(&self.start_month) {
            return Err(HeatmapError::Config(format!(
                "start_month must be between 1 and 12, got {}",
                self.start_month
            )));
        }
        if NaiveDate::from_ymd_opt(self.start_year, self.start_month, 1)
            .and_then(|d| d.checked_add_months(Months::new(MONTHS_IN_WINDOW as u32)))
            .is_none()
        {
            return Err(HeatmapError::Config(format!(
                "start_year {} is out of range",
                self.start_year
            )));
        }
        Ok(())
    }

    /// The twelve `(year, month)` pairs in display order.
    pub fn months(&self) -> Result<Vec<MonthInfo>, HeatmapError> {
        self.validate()?;
        let mut months = Vec::with_capacity(MONTHS_IN_WINDOW);
        for i in 0..MONTHS_IN_WINDOW as u32 {
            let zero_based = self.start_month - 1 + i;
            let year = self.start_year + (zero_based / 12) as i32;
            let month = zero_based % 12 + 1;
            months.push(MonthInfo::new(year, month).ok_or_else(|| {
                HeatmapError::Config(format!("invalid month {year}-{month:02}"))
            })?);
        }
        Ok(months)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let Some(start) = NaiveDate::from_ymd_opt(self.start_year, self.start_month, 1) else {
            return false;
        };
        let Some(end) = start.checked_add_months(Months::new(MONTHS_IN_WINDOW as u32)) else {
            return false;
        };
        start <= date && date < end
    }
}

/// One month of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthInfo {
    pub year: i32,
    pub month: u32,
    first: NaiveDate,
}

impl MonthInfo {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month, first })
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// `"September 2023"`.
    pub fn title(&self) -> String {
        format!("{} {}", self.name(), self.year)
    }

    /// Weekday of the 1st, Sunday = 0.
    pub fn starting_day(&self) -> usize {
        self.first.weekday().num_days_from_sunday() as usize
    }

    pub fn days_in_month(&self) -> u32 {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

/// One slot of a month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarCell {
    /// Absent for the leading padding slots.
    pub date: Option<NaiveDate>,
    pub has_activity: bool,
    pub value: Option<u64>,
    pub url: Option<String>,
    pub fill: Rgb,
    pub text_color: Rgb,
}

impl CalendarCell {
    pub fn padding(fill: Rgb, text_color: Rgb) -> Self {
        Self {
            date: None,
            has_activity: false,
            value: None,
            url: None,
            fill,
            text_color,
        }
    }

    pub fn is_padding(&self) -> bool {
        self.date.is_none()
    }
}

/// First record posted on `date`. Later records for the same day are ignored.
pub fn find_activity(records: &[ActivityRecord], date: NaiveDate) -> Option<&ActivityRecord> {
    records.iter().find(|r| r.date == date)
}

/// Builds the slots for `month`: `starting_day` padding slots followed by one
/// slot per day. `shade` supplies `(fill, text)` for a day with activity.
pub fn month_cells(
    month: &MonthInfo,
    records: &[ActivityRecord],
    placeholder: (Rgb, Rgb),
    shade: impl Fn(u64) -> (Rgb, Rgb),
) -> Vec<CalendarCell> {
    let (empty_fill, empty_text) = placeholder;
    let days = month.days_in_month();
    let mut cells = Vec::with_capacity(month.starting_day() + days as usize);

    for _ in 0..month.starting_day() {
        cells.push(CalendarCell::padding(empty_fill, empty_text));
    }

    for date in (1..=days).filter_map(|d| month.day(d)) {
        let cell = match find_activity(records, date) {
            Some(post) => {
                let (fill, text_color) = shade(post.value);
                CalendarCell {
                    date: Some(date),
                    has_activity: true,
                    value: Some(post.value),
                    url: Some(post.url.clone()),
                    fill,
                    text_color,
                }
            }
            None => CalendarCell {
                date: Some(date),
                has_activity: false,
                value: None,
                url: None,
                fill: empty_fill,
                text_color: empty_text,
            },
        };
        cells.push(cell);
    }

    cells
}
