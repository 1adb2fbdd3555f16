//! Report period resolution
//!
//! A report always covers one calendar month: the month preceding a
//! reference date. The reference date is passed in explicitly so the
//! window never depends on the wall clock.

use chrono::{Datelike, Duration, Local, Months, NaiveDate, TimeZone};

use crate::error::{Error, Result};

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Localized (pt-BR) name for a month number in 1..=12
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// A calendar month in the local timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    first_day: NaiveDate,
    next_first_day: NaiveDate,
}

impl ReportPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation(format!("Invalid month: {}", month)));
        }

        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::validation(format!("Year out of range: {}", year)))?;
        let next_first_day = first_day
            .checked_add_months(Months::new(1))
            .ok_or_else(|| Error::validation(format!("Year out of range: {}", year)))?;

        Ok(Self {
            first_day,
            next_first_day,
        })
    }

    /// The month before the one containing `reference`
    pub fn previous_month(reference: NaiveDate) -> Result<Self> {
        if reference.month() == 1 {
            Self::new(reference.year() - 1, 12)
        } else {
            Self::new(reference.year(), reference.month() - 1)
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.first_day.month0() as usize]
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// First day of the following month (exclusive upper bound)
    pub fn next_first_day(&self) -> NaiveDate {
        self.next_first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next_first_day - Duration::days(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_day <= date && date < self.next_first_day
    }

    /// Local midnight at the start of the period, as UNIX milliseconds
    pub fn started_after_millis(&self) -> Result<i64> {
        local_midnight_millis(self.first_day())
    }

    /// Local midnight at the start of the following month, as UNIX milliseconds
    pub fn started_before_millis(&self) -> Result<i64> {
        local_midnight_millis(self.next_first_day())
    }
}

fn local_midnight_millis(date: NaiveDate) -> Result<i64> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::internal(format!("No midnight for {}", date)))?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| Error::internal(format!("Local midnight does not exist for {}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_previous_month_same_year() {
        let period = ReportPeriod::previous_month(date(2024, 3, 15)).unwrap();
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), 2);
    }

    #[test]
    fn test_previous_month_wraps_year() {
        let period = ReportPeriod::previous_month(date(2024, 1, 1)).unwrap();
        assert_eq!(period.year(), 2023);
        assert_eq!(period.month(), 12);
        assert_eq!(period.first_day(), date(2023, 12, 1));
        assert_eq!(period.last_day(), date(2023, 12, 31));
    }

    #[test]
    fn test_last_day_leap_february() {
        let period = ReportPeriod::new(2024, 2).unwrap();
        assert_eq!(period.last_day(), date(2024, 2, 29));
        assert_eq!(period.next_first_day(), date(2024, 3, 1));
    }

    #[test]
    fn test_contains() {
        let period = ReportPeriod::new(2024, 5).unwrap();
        assert!(period.contains(date(2024, 5, 1)));
        assert!(period.contains(date(2024, 5, 31)));
        assert!(!period.contains(date(2024, 6, 1)));
        assert!(!period.contains(date(2024, 4, 30)));
        assert!(!period.contains(date(2023, 5, 10)));
    }

    #[test]
    fn test_invalid_month() {
        assert!(ReportPeriod::new(2024, 0).is_err());
        assert!(ReportPeriod::new(2024, 13).is_err());
    }

    #[test]
    fn test_year_out_of_range() {
        assert!(matches!(ReportPeriod::new(i32::MAX, 1), Err(Error::Validation(_))));
        assert!(ReportPeriod::new(NaiveDate::MAX.year(), 12).is_err());
        assert!(ReportPeriod::previous_month(NaiveDate::MIN).is_err());
    }

    #[test]
    fn test_millis_bounds_span_the_month() {
        let period = ReportPeriod::new(2024, 1).unwrap();
        let start = period.started_after_millis().unwrap();
        let end = period.started_before_millis().unwrap();
        let days = (end - start) / (24 * 60 * 60 * 1000);
        // DST shifts can only move the bound by an hour
        assert!((30..=31).contains(&days));
        assert!(start < end);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), Some("Janeiro"));
        assert_eq!(month_name(3), Some("Março"));
        assert_eq!(month_name(12), Some("Dezembro"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
        assert_eq!(ReportPeriod::new(2024, 10).unwrap().month_name(), "Outubro");
    }
}
