//! Data models for timesheet

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Date format used for the `Dia` column (DD/MM/YYYY)
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a calendar date the way the spreadsheet expects it
pub fn format_display_date(day: NaiveDate) -> String {
    day.format(DISPLAY_DATE_FORMAT).to_string()
}

// ============ Durations ============

/// Time spent, kept as whole seconds so sums stay exact
///
/// Conversion to hours or day fractions happens only when a value is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkedHours(i64);

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

impl WorkedHours {
    /// Round fractional hours to the nearest second
    pub fn from_hours(hours: f64) -> Self {
        Self((hours * SECONDS_PER_HOUR).round() as i64)
    }

    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn seconds(self) -> i64 {
        self.0
    }

    pub fn hours(self) -> f64 {
        self.0 as f64 / SECONDS_PER_HOUR
    }

    /// Fraction of a 24-hour day, the unit spreadsheets use for duration cells
    pub fn day_fraction(self) -> f64 {
        self.0 as f64 / SECONDS_PER_DAY
    }
}

impl Add for WorkedHours {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for WorkedHours {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for WorkedHours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

// ============ Worklog entries ============

/// Key identifying a task for reporting: `project:[ticket] summary`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskIdentity(String);

impl TaskIdentity {
    pub fn new(project_name: &str, ticket_key: &str, summary: &str) -> Self {
        Self(format!("{}:[{}] {}", project_name, ticket_key, summary))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single worklog record after parsing, shared by every source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWorklogEntry {
    pub project_name: String,
    pub ticket_key: String,
    pub summary: String,
    pub day: NaiveDate,
    pub hours: WorkedHours,
    /// Author account id (tracker sources only)
    pub author: Option<String>,
}

impl RawWorklogEntry {
    pub fn task_identity(&self) -> TaskIdentity {
        TaskIdentity::new(&self.project_name, &self.ticket_key, &self.summary)
    }

    pub fn display_date(&self) -> String {
        format_display_date(self.day)
    }
}

// ============ Aggregation ============

/// All tasks worked on during one calendar day, deduplicated by identity
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub display_date: String,
    /// Accumulated hours per task, in first-seen order
    pub tasks: IndexMap<TaskIdentity, WorkedHours>,
}

impl DayBucket {
    pub fn total_hours(&self) -> WorkedHours {
        self.tasks.values().copied().sum()
    }
}

/// One output row: a day, its tasks and the time spent as a fraction of a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "Dia")]
    pub day: String,
    #[serde(rename = "Atividade")]
    pub activity: String,
    #[serde(rename = "Horas trabalhadas")]
    pub hours_fraction: f64,
}

impl SummaryRow {
    /// Day of month parsed from the `DD/MM/YYYY` display date
    pub fn day_of_month(&self) -> Option<u32> {
        self.day.split('/').next()?.parse().ok()
    }

    /// Month number parsed from the `DD/MM/YYYY` display date
    pub fn month(&self) -> Option<u32> {
        self.day.split('/').nth(1)?.parse().ok()
    }
}

/// Trailing row that sums the month inside the spreadsheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsRow {
    #[serde(rename = "Dia")]
    pub label: String,
    #[serde(rename = "Atividade")]
    pub activity: String,
    #[serde(rename = "Horas trabalhadas")]
    pub formula: String,
}
