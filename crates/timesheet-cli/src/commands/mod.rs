//! CLI commands module

pub mod report;

use crate::output::OutputFormat;

/// Shared context for all commands
pub struct Context {
    pub format: OutputFormat,
    pub quiet: bool,
}
