use chrono::{Duration, NaiveDate};

use crate::catalog::{DateHandling, ReportDescriptor};
use crate::error::{ReportError, Result};

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

/// Inclusive calendar range, always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ReportError::InvalidRange(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` dates.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// `today - days ..= today`
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        Self {
            start: today - Duration::days(days),
            end: today,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_timestamp(&self) -> String {
        format!("{}T00:00:00", self.start.format("%Y-%m-%d"))
    }

    pub fn end_timestamp(&self) -> String {
        format!("{}T23:59:59", self.end.format("%Y-%m-%d"))
    }

    /// Midnight at the start of the end date, used for single-date reports.
    pub fn end_date_timestamp(&self) -> String {
        format!("{}T00:00:00", self.end.format("%Y-%m-%d"))
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidRange(format!("'{s}' is not a YYYY-MM-DD date")))
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Ordered query parameters. Inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap(Vec<(String, String)>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn extend(&mut self, other: ParamMap) {
        for (k, v) in other.0 {
            self.insert(k, v);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Which request the parameters are for. Some reports take a different
/// date shape on the spreadsheet endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Preview,
    Export,
}

/// User-supplied adjustments layered on top of the descriptor's rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Replaces the descriptor's `days_ahead` default; ignored by reports
    /// that don't take one.
    pub days_ahead: Option<u32>,
    pub store_id: Option<i64>,
}

pub fn build(
    descriptor: &ReportDescriptor,
    range: &DateRange,
    purpose: Purpose,
    overrides: &Overrides,
) -> ParamMap {
    let mut params = ParamMap::new();

    let handling = match purpose {
        Purpose::Preview => descriptor.preview_dates,
        Purpose::Export => descriptor.export_dates,
    };
    match handling {
        DateHandling::None => {}
        DateHandling::Range => {
            params.insert("start_date", range.start_timestamp());
            params.insert("end_date", range.end_timestamp());
        }
        DateHandling::SingleDate => {
            params.insert("date", range.end_date_timestamp());
        }
    }

    if let Some(extra) = descriptor.extra_params {
        params.extend(extra(range));
    }
    if let Some(days) = overrides.days_ahead {
        if params.contains_key("days_ahead") {
            params.insert("days_ahead", days);
        }
    }
    if let Some(store) = overrides.store_id {
        params.insert("store_id", store);
    }

    params
}
