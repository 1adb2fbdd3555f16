//! Report rendering
//!
//! The table view shows durations as `HH:MM` with the month total as a
//! footer. The JSON view keeps the day fractions written to the sheet.

use clap::ValueEnum;
use colored::Colorize;
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};
use timesheet_core::{totals_row, SummaryRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Tabled)]
struct TableRow<'a> {
    #[tabled(rename = "Dia")]
    day: &'a str,
    #[tabled(rename = "Atividade")]
    activity: &'a str,
    #[tabled(rename = "Horas trabalhadas")]
    duration: String,
}

impl<'a> From<&'a SummaryRow> for TableRow<'a> {
    fn from(row: &'a SummaryRow) -> Self {
        Self {
            day: &row.day,
            activity: &row.activity,
            duration: format_duration(row.hours_fraction),
        }
    }
}

/// Render a day fraction as elapsed `HH:MM`
pub fn format_duration(day_fraction: f64) -> String {
    let minutes = (day_fraction * 24.0 * 60.0).round() as i64;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Render the report in the requested format
pub fn render_report(rows: &[SummaryRow], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Table => Ok(render_table(rows)),
    }
}

fn render_table(rows: &[SummaryRow]) -> String {
    // The month name comes from the data, as in the sheet's totals row
    let Some(totals) = totals_row(rows, 1) else {
        return "No worklogs found.".to_string();
    };
    let total: f64 = rows.iter().map(|row| row.hours_fraction).sum();

    Table::new(rows.iter().map(TableRow::from))
        .with(Style::modern())
        .with(Panel::footer(format!("{} {}", totals.label, format_duration(total))))
        .to_string()
}

pub fn print_report(rows: &[SummaryRow], format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render_report(rows, format)?);
    Ok(())
}

/// Progress goes to stderr so stdout stays parseable
pub fn print_status(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message.green());
    }
}
