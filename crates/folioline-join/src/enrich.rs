//! Non-staff users holding service point assignments.
//!
//! Walks the assignment snapshot, looks each user up on the gateway and
//! keeps the ones outside the staff patron group, decorated with their
//! patron group name and service point names.

use std::path::Path;

use anyhow::{Context, Result};
use folioline_core::{HeaderMap, OkapiClient, ProgressContext, Transport, fmt_num};
use folioline_export::snapshot::{load_service_point_users, require_input};
use folioline_export::writer::write_tsv;
use folioline_export::{Entity, FlatRow, flatten};
use rustc_hash::FxHashMap;

use crate::config::EnrichConfig;
use crate::merge::create_parent;

pub const PATRON_GROUP_NAME_COLUMN: &str = "patronGroupName";
pub const SERVICE_POINT_NAMES_COLUMN: &str = "servicePointNames";

const NAME_SEPARATOR: &str = "; ";

#[derive(Debug, Default)]
pub struct EnrichSummary {
    pub relations: usize,
    /// Relations without a user or without service points
    pub skipped: usize,
    /// Users the gateway did not return
    pub missing: usize,
    /// Users in the excluded patron group
    pub excluded: usize,
    pub exported: usize,
}

/// Per-run memo of `path/{id}` → one string field of the record.
struct NameCache {
    endpoint: &'static str,
    field: &'static str,
    names: FxHashMap<String, String>,
}

impl NameCache {
    fn new(endpoint: &'static str, field: &'static str) -> Self {
        Self {
            endpoint,
            field,
            names: FxHashMap::default(),
        }
    }

    /// Failed lookups are cached as empty names too
    fn resolve<T: Transport>(
        &mut self,
        client: &OkapiClient<T>,
        headers: &HeaderMap,
        id: &str,
    ) -> String {
        if let Some(name) = self.names.get(id) {
            return name.clone();
        }
        let name = client
            .get_record(headers, &format!("{}/{id}", self.endpoint))
            .and_then(|record| record[self.field].as_str().map(String::from))
            .unwrap_or_default();
        self.names.insert(id.to_string(), name.clone());
        name
    }

    fn len(&self) -> usize {
        self.names.len()
    }
}

pub fn run<T: Transport>(
    client: &mut OkapiClient<T>,
    config: &EnrichConfig,
    progress: &ProgressContext,
) -> Result<EnrichSummary> {
    require_input(&config.service_point_users_json, "fetch service-point-users")?;
    let relations = load_service_point_users(&config.service_point_users_json)?;
    log::info!("Loaded {} assignments", fmt_num(relations.len()));

    let headers = client
        .auth_headers()
        .context("Cannot authenticate for user lookups")?;
    let client = &*client;

    let mut groups = NameCache::new("groups", "group");
    let mut service_points = NameCache::new("service-points", "name");
    let mut summary = EnrichSummary {
        relations: relations.len(),
        ..Default::default()
    };
    let mut rows: Vec<FlatRow> = Vec::new();

    let pb = progress.stage_line("enrich");
    for (idx, relation) in relations.iter().enumerate() {
        pb.set_message(format!(
            "{}/{} assignments",
            fmt_num(idx + 1),
            fmt_num(relations.len())
        ));

        let user_id = match relation.user_id.as_deref() {
            Some(id) if !id.is_empty() && !relation.service_point_ids().is_empty() => id,
            _ => {
                summary.skipped += 1;
                continue;
            }
        };

        let Some(user) = client.get_record(&headers, &format!("users/{user_id}")) else {
            summary.missing += 1;
            continue;
        };

        let group_id = user["patronGroup"].as_str().unwrap_or_default();
        if group_id == config.excluded_patron_group {
            summary.excluded += 1;
            continue;
        }

        let group_name = if group_id.is_empty() {
            String::new()
        } else {
            groups.resolve(client, &headers, group_id)
        };
        let sp_names: Vec<String> = relation
            .service_point_ids()
            .iter()
            .map(|sp_id| service_points.resolve(client, &headers, sp_id))
            .collect();

        let mut row = flatten(&user, Entity::Users.columns());
        row.set(PATRON_GROUP_NAME_COLUMN, group_name);
        row.set(SERVICE_POINT_NAMES_COLUMN, sp_names.join(NAME_SEPARATOR));
        rows.push(row);
    }
    pb.finish_and_clear();

    log::debug!(
        "Resolved {} patron groups and {} service points",
        groups.len(),
        service_points.len()
    );

    summary.exported = rows.len();
    if rows.is_empty() {
        log::warn!("No users to export");
        remove_stale(&config.output)?;
        return Ok(summary);
    }

    create_parent(&config.output)?;
    write_tsv(&config.output, &rows)?;
    log::info!(
        "Exported {} users to {}",
        fmt_num(rows.len()),
        config.output.display()
    );
    Ok(summary)
}

/// A report left by an earlier run must not pass for this run's result
fn remove_stale(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::info!("Removed previous report {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Cannot remove {}", path.display())),
    }
}
