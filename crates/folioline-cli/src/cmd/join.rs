//! Join subcommand - add service point names to the staff users table

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use folioline_core::fmt_num;
use folioline_export::OutputLayout;
use folioline_join::JoinConfig;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Staff users TSV (default: <output>/users.tsv)
    #[arg(long)]
    pub users: Option<PathBuf>,

    /// Service point assignments JSON
    #[arg(long)]
    pub assignments: Option<PathBuf>,

    /// Service points JSON
    #[arg(long)]
    pub service_points: Option<PathBuf>,

    /// Merged TSV path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(args: JoinArgs, config: &Config) -> Result<()> {
    let defaults = JoinConfig::from_layout(&OutputLayout::new(&config.output.dir));
    let join = JoinConfig {
        users_tsv: args.users.unwrap_or(defaults.users_tsv),
        service_point_users_json: args
            .assignments
            .unwrap_or(defaults.service_point_users_json),
        service_points_json: args.service_points.unwrap_or(defaults.service_points_json),
        output: args.report.unwrap_or(defaults.output),
    };

    log::info!("Joining users with service points");
    log::info!("  Users: {}", join.users_tsv.display());
    log::info!("  Output: {}", join.output.display());

    let summary = folioline_join::run(&join)?;

    super::print_summary(
        "Join",
        &[
            ("Users", fmt_num(summary.users)),
            ("With service points", fmt_num(summary.with_service_points)),
            ("Unresolved ids", fmt_num(summary.unresolved)),
            ("Output", join.output.display().to_string()),
        ],
    );
    Ok(())
}
