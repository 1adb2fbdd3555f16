//! Daily worklog summaries
//!
//! Reduces normalized worklog entries to one row per calendar day:
//! entries are bucketed by display date, tasks sharing an identity are
//! merged by summing their hours, and each bucket becomes a `SummaryRow`.

use indexmap::IndexMap;

use crate::models::{
    DayBucket, RawWorklogEntry, SummaryRow, TaskIdentity, TotalsRow, WorkedHours,
};
use crate::services::period::month_name;

/// Column holding `Horas trabalhadas` in the destination sheet
pub const HOURS_COLUMN: char = 'C';

/// Group entries by their `DD/MM/YYYY` date, keeping first-seen day order
pub fn group_by_day(
    entries: impl IntoIterator<Item = RawWorklogEntry>,
) -> IndexMap<String, Vec<RawWorklogEntry>> {
    entries.into_iter().fold(IndexMap::new(), |mut days, entry| {
        days.entry(entry.display_date()).or_insert_with(Vec::new).push(entry);
        days
    })
}

/// Merge entries of the same task by adding their hours
///
/// Tasks keep the order in which they were first seen.
pub fn sum_tasks<'a>(
    entries: impl IntoIterator<Item = &'a RawWorklogEntry>,
) -> IndexMap<TaskIdentity, WorkedHours> {
    entries.into_iter().fold(IndexMap::new(), |tasks, entry| {
        with_task(tasks, entry.task_identity(), entry.hours)
    })
}

fn with_task(
    mut tasks: IndexMap<TaskIdentity, WorkedHours>,
    task: TaskIdentity,
    hours: WorkedHours,
) -> IndexMap<TaskIdentity, WorkedHours> {
    *tasks.entry(task).or_default() += hours;
    tasks
}

/// Bucket entries by day, deduplicating tasks within each day
pub fn bucket_by_day(entries: impl IntoIterator<Item = RawWorklogEntry>) -> Vec<DayBucket> {
    group_by_day(entries)
        .into_iter()
        .map(|(display_date, day_entries)| DayBucket {
            display_date,
            tasks: sum_tasks(&day_entries),
        })
        .collect()
}

/// Turn one bucket into its output row
pub fn build_row(bucket: &DayBucket) -> SummaryRow {
    let activity = bucket
        .tasks
        .keys()
        .map(TaskIdentity::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    SummaryRow {
        day: bucket.display_date.clone(),
        activity,
        hours_fraction: bucket.total_hours().day_fraction(),
    }
}

/// Build all rows, sorted by day of month
///
/// Sorting on the day number alone is only meaningful because a report
/// never spans more than one month.
pub fn build_summary_rows(buckets: &[DayBucket]) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = buckets.iter().map(build_row).collect();
    rows.sort_by_key(|row| row.day_of_month().unwrap_or(u32::MAX));
    rows
}

/// Full pipeline from normalized entries to sorted summary rows
pub fn summarize(entries: impl IntoIterator<Item = RawWorklogEntry>) -> Vec<SummaryRow> {
    let buckets = bucket_by_day(entries);
    log::debug!("[summary] {} day bucket(s)", buckets.len());
    build_summary_rows(&buckets)
}

/// Totals row for rows that will be written starting at `first_row_number`
///
/// Returns `None` when there are no rows, since the month is read from the
/// first one.
pub fn totals_row(rows: &[SummaryRow], first_row_number: u32) -> Option<TotalsRow> {
    let first = rows.first()?;
    let month = first.month().and_then(month_name)?;
    let last_row_number = first_row_number + rows.len() as u32 - 1;

    Some(TotalsRow {
        label: format!("Total {}:", month),
        activity: String::new(),
        formula: format!(
            "=SUM({col}{}:{col}{})",
            first_row_number,
            last_row_number,
            col = HOURS_COLUMN
        ),
    })
}
