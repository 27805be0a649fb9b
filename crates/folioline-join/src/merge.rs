//! Staff users + service point names merge

use std::path::Path;

use anyhow::{Context, Result};
use folioline_core::fmt_num;
use folioline_export::Table;
use folioline_export::snapshot::{
    load_service_point_users, load_service_points, read_table, require_input,
};
use folioline_export::writer::write_table;

use crate::config::JoinConfig;
use crate::lookup::{
    AssignmentMap, NameMap, resolve_names, service_point_names, user_to_service_points,
};

/// Column appended to the users table
pub const SERVICE_POINTS_COLUMN: &str = "servicePoints";

/// Separator between service point names in one cell
const NAME_SEPARATOR: &str = ", ";

/// Summary statistics from the merge.
#[derive(Debug, Default)]
pub struct JoinSummary {
    pub users: usize,
    /// Users with at least one assigned service point
    pub with_service_points: usize,
    /// Assigned ids with no matching service point
    pub unresolved: usize,
}

/// Append (or overwrite) the `servicePoints` column of `users`.
///
/// Each cell holds the names of the user's assigned service points joined
/// by `", "`. Users without an assignment get an empty cell.
pub fn add_service_points_column(
    users: &mut Table,
    assignments: &AssignmentMap,
    names: &NameMap,
) -> Result<JoinSummary> {
    let id_idx = users
        .column_index("id")
        .context("users table has no 'id' column")?;
    let target = match users.column_index(SERVICE_POINTS_COLUMN) {
        Some(idx) => idx,
        None => {
            users.headers.push(SERVICE_POINTS_COLUMN.to_string());
            users.headers.len() - 1
        }
    };

    let width = users.headers.len();
    let mut summary = JoinSummary {
        users: users.rows.len(),
        ..Default::default()
    };
    for row in &mut users.rows {
        row.resize(width, String::new());
        let ids = assignments
            .get(&row[id_idx])
            .map(Vec::as_slice)
            .unwrap_or_default();
        if !ids.is_empty() {
            summary.with_service_points += 1;
        }
        summary.unresolved += ids.iter().filter(|id| !names.contains_key(*id)).count();
        row[target] = resolve_names(ids, names).join(NAME_SEPARATOR);
    }
    Ok(summary)
}

/// Run the merge: load three snapshots, decorate users, write the report.
pub fn run(config: &JoinConfig) -> Result<JoinSummary> {
    require_input(&config.users_tsv, "fetch staff")?;
    require_input(&config.service_point_users_json, "fetch service-point-users")?;
    require_input(&config.service_points_json, "fetch service-points")?;

    log::info!("Loading snapshots");
    if is_empty_file(&config.users_tsv)? {
        log::warn!(
            "{} has no users, writing an empty report",
            config.users_tsv.display()
        );
        create_parent(&config.output)?;
        std::fs::write(&config.output, "")
            .with_context(|| format!("Cannot write {}", config.output.display()))?;
        return Ok(JoinSummary::default());
    }
    let mut users = read_table(&config.users_tsv, &["id"])?;
    let assignments = load_service_point_users(&config.service_point_users_json)?;
    let points = load_service_points(&config.service_points_json)?;

    log::info!(
        "Building lookups from {} assignments and {} service points",
        fmt_num(assignments.len()),
        fmt_num(points.len())
    );
    let user_map = user_to_service_points(&assignments);
    let names = service_point_names(&points);

    let summary = add_service_points_column(&mut users, &user_map, &names)?;
    if summary.unresolved > 0 {
        log::warn!(
            "{} assigned service point ids have no matching service point",
            summary.unresolved
        );
    }

    create_parent(&config.output)?;
    write_table(&config.output, &users.headers, &users.rows)?;

    log::info!(
        "Merged {} users ({} with service points) into {}",
        fmt_num(summary.users),
        fmt_num(summary.with_service_points),
        config.output.display()
    );
    Ok(summary)
}

/// Empty snapshots are written as zero-byte files
fn is_empty_file(path: &Path) -> Result<bool> {
    let meta =
        std::fs::metadata(path).with_context(|| format!("Cannot stat {}", path.display()))?;
    Ok(meta.len() == 0)
}

pub(crate) fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    Ok(())
}
