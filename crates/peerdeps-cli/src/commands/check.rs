//! `peerdeps check` command implementation.
//!
//! Validates every root with a handler that records failures instead of
//! raising them, so one bad package does not hide the rest.

use std::cell::RefCell;

use anyhow::Context;
use peerdeps_core::error::PeerResult;
use peerdeps_core::types::Failure;
use peerdeps_validate::{format_failure, Assumption, ValidateOptions};
use serde::Serialize;
use tracing::debug;

use super::CommandContext;
use crate::output::errors::ErrorFormatter;
use crate::OutputFormat;

/// Parsed `check` arguments
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    pub roots: Vec<String>,
    pub from: Option<String>,
    pub assume: Vec<String>,
    pub no_cache: bool,
}

/// Outcome of one `check` run
#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    pub roots: Vec<RootReport>,
}

#[derive(Debug, Serialize)]
pub struct RootReport {
    /// The root as given on the command line
    pub root: String,
    #[serde(flatten)]
    pub status: RootStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RootStatus {
    Satisfied,
    Unmet { failure: Failure },
    Error { message: String, help: Option<String> },
}

impl CheckReport {
    /// Check if every root was satisfied
    pub fn passed(&self) -> bool {
        self.roots
            .iter()
            .all(|entry| matches!(entry.status, RootStatus::Satisfied))
    }

    pub fn failed(&self) -> usize {
        self.roots
            .iter()
            .filter(|entry| !matches!(entry.status, RootStatus::Satisfied))
            .count()
    }
}

/// Execute the `peerdeps check` command
pub fn execute(args: &CheckArgs, ctx: &CommandContext) -> PeerResult<CheckReport> {
    for spec in &args.assume {
        let assumption: Assumption = spec.parse()?;
        ctx.validator.assume(assumption)?;
    }

    let base = args.from.as_deref().map(|dir| ctx.resolve(dir));
    let roots = if args.roots.is_empty() {
        vec![".".to_string()]
    } else {
        args.roots.clone()
    };

    let mut report = CheckReport::default();
    for root in roots {
        let path = ctx.resolve(&root);
        let unmet = RefCell::new(None);

        let mut options = ValidateOptions::new()
            .cache(!args.no_cache)
            .on_failure(|failure| {
                *unmet.borrow_mut() = Some(failure.clone());
                Ok(())
            });
        if let Some(base) = &base {
            options = options.resolve_from(base.clone());
        }

        let status = match ctx.validator.validate(&path, options) {
            Ok(()) => match unmet.into_inner() {
                Some(failure) => RootStatus::Unmet { failure },
                None => RootStatus::Satisfied,
            },
            Err(err) => RootStatus::Error {
                message: err.to_string(),
                help: err.suggestion().map(str::to_string),
            },
        };

        debug!(%root, %path, ?status, "checked root");
        report.roots.push(RootReport { root, status });
    }

    Ok(report)
}

/// Print a report in the requested format
pub fn print(report: &CheckReport, format: OutputFormat, ctx: &CommandContext) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("Failed to serialize check report")?;
            ctx.output.raw(&json);
        },
        OutputFormat::Human => print_human(report, ctx),
    }

    Ok(())
}

fn print_human(report: &CheckReport, ctx: &CommandContext) {
    let colors = ctx.output.colors();
    let formatter = ErrorFormatter::with_colors(colors);

    for entry in &report.roots {
        match &entry.status {
            RootStatus::Satisfied => {
                ctx.output
                    .success(&format!("{}: peerDependencies satisfied", colors.bold(&entry.root)));
            },
            RootStatus::Unmet { failure } => {
                ctx.output
                    .error(&format!("{}: {}", colors.bold(&entry.root), format_failure(failure)));
            },
            RootStatus::Error { message, help } => {
                eprintln!("{}", formatter.format_simple(&format!("{}: {}", entry.root, message)));
                if let Some(help) = help {
                    eprintln!("{}: {}", colors.dim("help"), help);
                }
            },
        }
    }

    let failed = report.failed();
    if failed == 0 {
        ctx.output
            .info(&format!("Checked {} root(s), all satisfied", report.roots.len()));
    } else {
        ctx.output.warn(&format!(
            "Checked {} root(s), {} with problems",
            report.roots.len(),
            failed
        ));
    }
}
