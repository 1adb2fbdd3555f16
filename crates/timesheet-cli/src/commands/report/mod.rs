//! Report command
//!
//! Runs the whole pipeline: pick a source, normalize its worklogs, fold them
//! into daily rows, then optionally write and print the result.

mod helpers;
mod settings;

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use timesheet_core::{
    build_source, publish_report, summarize, ExcelDestination, GoogleSheetsDestination,
    ReportPeriod, SheetDestination, SourceSelection, SummaryRow,
};

use super::Context;
use crate::output::{print_report, print_status};
use helpers::parse_date;
pub use settings::{GoogleArgs, JiraArgs};

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Read worklogs from a CSV export instead of Jira
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Append the report to the destination spreadsheet
    #[arg(short, long)]
    pub write: bool,

    /// Print the report
    #[arg(short, long)]
    pub print: bool,

    /// With --write, save to this .xlsx file instead of Google Sheets
    #[arg(long)]
    pub xlsx: Option<PathBuf>,

    /// Report the month before this date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub reference_date: Option<String>,

    #[command(flatten)]
    pub jira: JiraArgs,

    #[command(flatten)]
    pub google: GoogleArgs,
}

pub async fn execute(ctx: &Context, args: ReportArgs) -> Result<()> {
    let reference = match &args.reference_date {
        Some(date) => parse_date(date)?,
        None => chrono::Local::now().date_naive(),
    };
    let period = ReportPeriod::previous_month(reference)?;

    let rows = collect_rows(&args, period).await?;

    if args.write {
        write_rows(ctx, &args, &rows).await?;
    }

    if args.print {
        print_report(&rows, ctx.format)?;
    }

    Ok(())
}

async fn collect_rows(args: &ReportArgs, period: ReportPeriod) -> Result<Vec<SummaryRow>> {
    let source_label = args
        .file
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "Jira".to_string());

    // A file always wins, so Jira settings only matter without one
    let jira = match args.file {
        Some(_) => None,
        None => args.jira.to_config()?,
    };

    let source = build_source(SourceSelection {
        file: args.file.clone(),
        jira,
        period,
    })
    .with_context(|| format!("Failed reading worklogs from {}", source_label))?;

    let entries = source
        .normalize()
        .await
        .with_context(|| format!("Failed reading worklogs from {}", source_label))?;

    log::info!(
        "[report] {} entries from {} for {}/{}",
        entries.len(),
        source.source_name(),
        period.month(),
        period.year()
    );

    Ok(summarize(entries))
}

async fn write_rows(ctx: &Context, args: &ReportArgs, rows: &[SummaryRow]) -> Result<()> {
    let destination: Box<dyn SheetDestination> = match &args.xlsx {
        Some(path) => Box::new(ExcelDestination::new(path)),
        None => {
            let config = args.google.to_config()?;
            Box::new(
                GoogleSheetsDestination::connect(&config)
                    .await
                    .context("Failed writing worklogs to Google Sheets")?,
            )
        }
    };

    let outcome = publish_report(destination.as_ref(), rows)
        .await
        .with_context(|| {
            format!("Failed writing worklogs to {}", destination.destination_name())
        })?;

    match outcome {
        Some(outcome) => print_status(
            &format!(
                "Wrote rows {}-{} and \"{}\" to {}",
                outcome.first_row,
                outcome.last_row,
                outcome.totals.label,
                destination.destination_name()
            ),
            ctx.quiet,
        ),
        None => print_status("No worklogs to write.", ctx.quiet),
    }

    Ok(())
}
