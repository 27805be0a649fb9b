//! Fetch subcommand - pull one collection into snapshot files

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use folioline_core::ProgressContext;
use folioline_export::{
    Entity, JobSummary, fetch_patron_groups, fetch_service_point_users, fetch_service_points,
    fetch_staff,
};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(subcommand)]
    pub entity: FetchEntity,
}

#[derive(Subcommand, Debug)]
pub enum FetchEntity {
    /// Users in the staff patron group
    Staff(StaffArgs),
    /// All service points
    ServicePoints,
    /// Service point assignments
    ServicePointUsers(AssignmentArgs),
    /// All patron groups
    PatronGroups,
    /// Every collection in dependency order
    All(StaffArgs),
}

#[derive(Args, Debug)]
pub struct StaffArgs {
    /// Patron group id identifying staff (overrides [fetch] staff_patron_group)
    #[arg(long)]
    pub patron_group: Option<String>,
}

#[derive(Args, Debug)]
pub struct AssignmentArgs {
    /// Keep only assignments of users in this id TSV, first column, header optional
    /// (bare flag: the staff id file from the output directory)
    #[arg(long, value_name = "IDS_TSV")]
    pub only_users: Option<Option<PathBuf>>,
}

pub fn run(args: FetchArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let export = super::export_config(config);
    let mut client = super::connect(config)?;

    let jobs = match args.entity {
        FetchEntity::Staff(staff) => {
            let group = config.staff_patron_group(staff.patron_group.as_deref())?;
            vec![fetch_staff(&mut client, &export, &group, progress)?]
        }
        FetchEntity::ServicePoints => vec![fetch_service_points(&mut client, &export, progress)?],
        FetchEntity::ServicePointUsers(assignments) => {
            let only_users = assignments
                .only_users
                .map(|path| path.unwrap_or_else(|| export.layout.snapshot(Entity::Users).ids));
            vec![fetch_service_point_users(
                &mut client,
                &export,
                progress,
                only_users.as_deref(),
            )?]
        }
        FetchEntity::PatronGroups => vec![fetch_patron_groups(&mut client, &export, progress)?],
        FetchEntity::All(staff) => {
            let group = config.staff_patron_group(staff.patron_group.as_deref())?;
            vec![
                fetch_staff(&mut client, &export, &group, progress)?,
                fetch_service_points(&mut client, &export, progress)?,
                fetch_service_point_users(&mut client, &export, progress, None)?,
                fetch_patron_groups(&mut client, &export, progress)?,
            ]
        }
    };

    super::print_jobs(&jobs);
    warn_partial(&jobs);
    Ok(())
}

/// Partial snapshots are kept but reported
pub(crate) fn warn_partial(jobs: &[JobSummary]) {
    for job in jobs.iter().filter(|j| j.truncated) {
        log::warn!(
            "{} snapshot is partial ({} records)",
            job.entity,
            job.records
        );
    }
}
