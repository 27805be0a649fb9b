//! Run subcommand - every stage in dependency order

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use folioline_core::ProgressContext;
use folioline_export::{
    Entity, fetch_patron_groups, fetch_service_point_users, fetch_service_points, fetch_staff,
    filter_service_point_users,
};
use folioline_join::{EnrichConfig, JoinConfig};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Patron group id identifying staff (overrides [fetch] staff_patron_group)
    #[arg(long)]
    pub patron_group: Option<String>,

    /// Also write the assignments of staff users only
    #[arg(long)]
    pub staff_assignments: bool,

    /// Skip the non-staff report
    #[arg(long)]
    pub skip_enrich: bool,
}

pub fn run(args: RunArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let start = Instant::now();
    let group = config.staff_patron_group(args.patron_group.as_deref())?;
    let export = super::export_config(config);
    let layout = &export.layout;
    let mut client = super::connect(config)?;

    log::info!("Running all stages into {}", layout.root().display());

    let mut jobs = vec![
        fetch_staff(&mut client, &export, &group, progress)?,
        fetch_service_points(&mut client, &export, progress)?,
        fetch_service_point_users(&mut client, &export, progress, None)?,
    ];
    if args.staff_assignments {
        let ids = layout.snapshot(Entity::Users).ids;
        jobs.push(filter_service_point_users(&export, &ids)?);
    }
    jobs.push(fetch_patron_groups(&mut client, &export, progress)?);
    super::print_jobs(&jobs);
    super::fetch::warn_partial(&jobs);

    let join = folioline_join::run(&JoinConfig::from_layout(layout)).context("Join stage failed")?;
    log::info!(
        "Join: {} of {} users have service points",
        join.with_service_points,
        join.users
    );

    if args.skip_enrich {
        log::info!("Enrich skipped");
    } else {
        let enrich = EnrichConfig::from_layout(layout, group);
        let summary = folioline_join::enrich::run(&mut client, &enrich, progress)
            .context("Enrich stage failed")?;
        super::enrich::print_enrich(&summary, &enrich);
    }

    super::print_summary(
        "Run",
        &[
            ("Output", layout.root().display().to_string()),
            ("Merged report", layout.merged_report().display().to_string()),
            ("Time", format!("{:.1}s", start.elapsed().as_secs_f64())),
        ],
    );
    Ok(())
}
