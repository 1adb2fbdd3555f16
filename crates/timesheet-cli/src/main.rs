//! Timesheet CLI - monthly worklog report
//!
//! Collects last month's worklogs from Jira (or a CSV export), folds them
//! into one row per day and optionally appends the rows to a spreadsheet.

mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(name = "timesheet")]
#[command(author, version, about = "Monthly timesheet report from Jira worklogs", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    report: commands::report::ReportArgs,

    /// Output format: table (default) or json
    #[arg(long, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Settings may live in a .env file next to where the tool runs
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let ctx = commands::Context {
        format: cli.format,
        quiet: cli.quiet,
    };

    commands::report::execute(&ctx, cli.report).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["timesheet", "-f", "log.csv", "-w", "-p", "-q"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.report.write);
        assert!(cli.report.print);
        assert_eq!(cli.report.file.unwrap().to_str(), Some("log.csv"));
    }
}
