//! Fetch jobs: paginate one entity, write its snapshot files

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use folioline_core::{OkapiClient, ProgressContext, Transport, fmt_num};
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::entity::Entity;
use crate::flatten::{FlatRow, flatten};
use crate::layout::{OutputLayout, SnapshotPaths};
use crate::snapshot::{read_records, read_user_ids, require_input};
use crate::writer::{write_ids, write_json, write_tsv};

/// Settings shared by all fetch jobs
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub layout: OutputLayout,
    pub page_size: usize,
}

/// Summary of one fetch job
#[derive(Debug)]
pub struct JobSummary {
    pub entity: Entity,
    /// Records written
    pub records: usize,
    /// Records fetched before any filter
    pub fetched: usize,
    pub requests: usize,
    /// A page failed and the snapshot is partial
    pub truncated: bool,
    pub paths: SnapshotPaths,
    pub elapsed: Duration,
}

/// Staff users: members of `patron_group`.
pub fn fetch_staff<T: Transport>(
    client: &mut OkapiClient<T>,
    config: &ExportConfig,
    patron_group: &str,
    progress: &ProgressContext,
) -> Result<JobSummary> {
    let query = format!("patronGroup==\"{patron_group}\"");
    let paths = config.layout.snapshot(Entity::Users);
    fetch_entity(client, Entity::Users, Some(query), config, &paths, progress, None)
}

pub fn fetch_service_points<T: Transport>(
    client: &mut OkapiClient<T>,
    config: &ExportConfig,
    progress: &ProgressContext,
) -> Result<JobSummary> {
    let paths = config.layout.snapshot(Entity::ServicePoints);
    fetch_entity(client, Entity::ServicePoints, None, config, &paths, progress, None)
}

/// All service-point assignments. With `only_users`, keep just the
/// assignments of users listed in that id file (first column, header
/// optional) and write the filtered snapshot instead.
pub fn fetch_service_point_users<T: Transport>(
    client: &mut OkapiClient<T>,
    config: &ExportConfig,
    progress: &ProgressContext,
    only_users: Option<&Path>,
) -> Result<JobSummary> {
    let Some(ids_path) = only_users else {
        let paths = config.layout.snapshot(Entity::ServicePointUsers);
        return fetch_entity(
            client,
            Entity::ServicePointUsers,
            None,
            config,
            &paths,
            progress,
            None,
        );
    };

    let user_ids = load_user_ids(ids_path)?;
    let paths = config.layout.filtered_service_point_users();
    fetch_entity(
        client,
        Entity::ServicePointUsers,
        None,
        config,
        &paths,
        progress,
        Some(&user_ids),
    )
}

/// Staff-only assignments cut from an assignment snapshot already on disk.
///
/// Same output as `fetch_service_point_users` with `only_users`, without
/// another pass over the gateway.
pub fn filter_service_point_users(config: &ExportConfig, ids_path: &Path) -> Result<JobSummary> {
    let start = Instant::now();
    let entity = Entity::ServicePointUsers;
    let source = config.layout.snapshot(entity).json;
    require_input(&source, "fetch service-point-users")?;
    let user_ids = load_user_ids(ids_path)?;

    let all = read_records(&source)?;
    let fetched = all.len();
    let records = restrict_to_users(all, &user_ids);
    log::info!(
        "{entity}: {} of {} records match the user list",
        fmt_num(records.len()),
        fmt_num(fetched)
    );

    let paths = config.layout.filtered_service_point_users();
    write_snapshot(&records, entity, &paths)?;
    Ok(JobSummary {
        entity,
        records: records.len(),
        fetched,
        requests: 0,
        truncated: false,
        paths,
        elapsed: start.elapsed(),
    })
}

fn load_user_ids(path: &Path) -> Result<FxHashSet<String>> {
    require_input(path, "fetch staff")?;
    let ids: FxHashSet<String> = read_user_ids(path)?.into_iter().collect();
    log::info!("Loaded {} user ids from {}", fmt_num(ids.len()), path.display());
    Ok(ids)
}

fn restrict_to_users(records: Vec<Value>, user_ids: &FxHashSet<String>) -> Vec<Value> {
    records
        .into_iter()
        .filter(|r| r["userId"].as_str().is_some_and(|id| user_ids.contains(id)))
        .collect()
}

pub fn fetch_patron_groups<T: Transport>(
    client: &mut OkapiClient<T>,
    config: &ExportConfig,
    progress: &ProgressContext,
) -> Result<JobSummary> {
    let paths = config.layout.snapshot(Entity::PatronGroups);
    fetch_entity(client, Entity::PatronGroups, None, config, &paths, progress, None)
}

fn fetch_entity<T: Transport>(
    client: &mut OkapiClient<T>,
    entity: Entity,
    query: Option<String>,
    config: &ExportConfig,
    paths: &SnapshotPaths,
    progress: &ProgressContext,
    only_users: Option<&FxHashSet<String>>,
) -> Result<JobSummary> {
    let start = Instant::now();
    let mut request = entity.page_request().with_limit(config.page_size);
    if let Some(query) = query {
        request = request.with_query(query);
    }

    log::info!("Fetching {entity}...");
    let pb = progress.stage_line(entity.name());
    let outcome = client
        .fetch_all(&request, &pb)
        .with_context(|| format!("Cannot authenticate to fetch {entity}"))?;
    pb.finish_and_clear();

    let fetched = outcome.records.len();
    let truncated = !outcome.is_complete();
    if truncated {
        log::warn!(
            "{entity}: pagination stopped early, writing {} records",
            fmt_num(fetched)
        );
    }

    let records = match only_users {
        Some(ids) => restrict_to_users(outcome.records, ids),
        None => outcome.records,
    };
    if only_users.is_some() {
        log::info!(
            "{entity}: {} of {} records match the user list",
            fmt_num(records.len()),
            fmt_num(fetched)
        );
    }

    write_snapshot(&records, entity, paths)?;

    Ok(JobSummary {
        entity,
        records: records.len(),
        fetched,
        requests: outcome.requests,
        truncated,
        paths: paths.clone(),
        elapsed: start.elapsed(),
    })
}

/// Write JSON, flattened TSV and id TSV for one snapshot.
pub fn write_snapshot(records: &[Value], entity: Entity, paths: &SnapshotPaths) -> Result<()> {
    for path in [&paths.json, &paths.tsv, &paths.ids] {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
    }

    let rows: Vec<FlatRow> = records
        .iter()
        .map(|r| flatten(r, entity.columns()))
        .collect();

    write_json(&paths.json, records)?;
    write_tsv(&paths.tsv, &rows)?;
    write_ids(&paths.ids, records, entity.id_columns())?;
    log::info!(
        "{entity}: wrote {} records to {}",
        fmt_num(records.len()),
        paths.json.display()
    );
    Ok(())
}
