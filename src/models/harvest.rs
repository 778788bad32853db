use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-user dense mapping of calendar day to whole hours worked. Once a
/// timesheet is built, every day of the run's date range has an entry.
pub type DailyHours = BTreeMap<NaiveDate, u32>;

/// A user record as returned by the Harvest "fetch user" endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A single raw time entry from Harvest. Hours arrive fractional and are
/// truncated to whole hours during aggregation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DayEntry {
    pub spent_date: NaiveDate,
    pub hours: f64,
}

/// Response wrapper for the time entries listing endpoint.
#[derive(Serialize, Deserialize, Debug)]
pub struct TimeEntriesResponse {
    pub time_entries: Vec<DayEntry>,
}

/// Inclusive calendar date range. Both boundary dates appear in the report,
/// matching the subject line naming them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> anyhow::Result<Self> {
        ensure!(
            start <= end,
            "Start date {start} is after end date {end}."
        );
        Ok(Self { start, end })
    }

    /// Every calendar day from start through end, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
