//! Loading snapshots written by earlier stages.
//!
//! Every loader checks the file exists and has the expected shape, so a
//! broken hand-off fails at the boundary with the file name in the error.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Service point as needed for name lookups
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePoint {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub discovery_display_name: Option<String>,
}

/// Service-point-to-user assignment
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePointUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub service_points_ids: Option<Vec<String>>,
    #[serde(default)]
    pub default_service_point_id: Option<String>,
}

impl ServicePointUser {
    pub fn service_point_ids(&self) -> &[String] {
        self.service_points_ids.as_deref().unwrap_or_default()
    }
}

/// Assignment files are either a bare array or the raw collection response
#[derive(Deserialize)]
#[serde(untagged)]
enum AssignmentFile {
    List(Vec<ServicePointUser>),
    Wrapped {
        #[serde(rename = "servicePointUsers", alias = "servicePointsUsers")]
        service_point_users: Vec<ServicePointUser>,
    },
}

/// Header + rows of a TSV snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Fail with a clear message when an upstream stage output is missing.
pub fn require_input(path: &Path, producer: &str) -> Result<()> {
    if !path.exists() {
        log::error!("Input file not found: {}", path.display());
        anyhow::bail!(
            "Missing input {} (produced by `{producer}`)",
            path.display()
        );
    }
    Ok(())
}

/// Load a JSON array snapshot as raw records
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    load_json(path)
}

/// Load a JSON array snapshot into typed records
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Unexpected snapshot layout in {}", path.display()))
}

pub fn load_service_points(path: &Path) -> Result<Vec<ServicePoint>> {
    load_json(path)
}

/// Load assignments from a bare array or a `{"servicePointUsers": [...]}` object
pub fn load_service_point_users(path: &Path) -> Result<Vec<ServicePointUser>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let file: AssignmentFile = serde_json::from_str(&content)
        .with_context(|| format!("Unexpected snapshot layout in {}", path.display()))?;
    Ok(match file {
        AssignmentFile::List(list) => list,
        AssignmentFile::Wrapped {
            service_point_users,
        } => service_point_users,
    })
}

/// Read a TSV snapshot; every name in `required` must be a header.
pub fn read_table(path: &Path, required: &[&str]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Cannot read header of {}", path.display()))?
        .iter()
        .map(String::from)
        .collect();
    for name in required {
        anyhow::ensure!(
            headers.iter().any(|h| h == name),
            "{} has no '{name}' column",
            path.display()
        );
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("{}: bad row {}", path.display(), line + 2))?;
        let mut row: Vec<String> = record.iter().map(String::from).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    Ok(Table { headers, rows })
}

/// Distinct values of one column, in first-seen order
pub fn read_id_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let table = read_table(path, &[column])?;
    let idx = table
        .column_index(column)
        .context("column vanished after validation")?;
    let mut seen = rustc_hash::FxHashSet::default();
    Ok(table
        .rows
        .into_iter()
        .filter_map(|mut row| {
            let id = std::mem::take(&mut row[idx]).trim().to_string();
            (!id.is_empty() && seen.insert(id.clone())).then_some(id)
        })
        .collect())
}

/// User ids from the first column of a TSV, with or without a header.
///
/// A leading `id` or `userId` cell (any case) is taken as the header row.
/// Blank and repeated ids are dropped; order is first-seen.
pub fn read_user_ids(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;

    let mut seen = rustc_hash::FxHashSet::default();
    let mut ids = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("{}: bad row {}", path.display(), line + 1))?;
        let id = record.get(0).unwrap_or_default().trim();
        let is_header = line == 0
            && (id.eq_ignore_ascii_case("id") || id.eq_ignore_ascii_case("userId"));
        if !is_header && !id.is_empty() && seen.insert(id.to_string()) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}
