//! Enrich subcommand - report non-staff users holding assignments

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use folioline_core::{ProgressContext, fmt_num};
use folioline_join::EnrichConfig;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Patron group to leave out (default: [fetch] staff_patron_group)
    #[arg(long)]
    pub exclude_group: Option<String>,

    /// Service point assignments JSON
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Report TSV path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(args: EnrichArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let group = config.staff_patron_group(args.exclude_group.as_deref())?;
    let layout = super::export_config(config).layout;
    let mut enrich = EnrichConfig::from_layout(&layout, group);
    if let Some(input) = args.input {
        enrich.service_point_users_json = input;
    }
    if let Some(report) = args.report {
        enrich.output = report;
    }

    let mut client = super::connect(config)?;
    let summary = folioline_join::enrich::run(&mut client, &enrich, progress)?;
    print_enrich(&summary, &enrich);
    Ok(())
}

pub(crate) fn print_enrich(summary: &folioline_join::EnrichSummary, config: &EnrichConfig) {
    let output = if summary.exported > 0 {
        config.output.display().to_string()
    } else {
        "none written".to_string()
    };
    super::print_summary(
        "Enrich",
        &[
            ("Assignments", fmt_num(summary.relations)),
            ("Skipped", fmt_num(summary.skipped)),
            ("Users not found", fmt_num(summary.missing)),
            ("Excluded group", fmt_num(summary.excluded)),
            ("Exported", fmt_num(summary.exported)),
            ("Output", output),
        ],
    );
}
