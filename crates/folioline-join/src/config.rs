use std::path::PathBuf;

use folioline_export::{Entity, OutputLayout};

/// Inputs and output of the staff/service-point merge.
#[derive(Debug, Clone)]
pub struct JoinConfig {
    /// Flattened staff users (`users.tsv`)
    pub users_tsv: PathBuf,
    /// Service-point assignments snapshot (JSON)
    pub service_point_users_json: PathBuf,
    /// Service points snapshot (JSON)
    pub service_points_json: PathBuf,
    /// Merged TSV
    pub output: PathBuf,
}

impl JoinConfig {
    /// Wire the merge to the files the fetch jobs write under `layout`
    pub fn from_layout(layout: &OutputLayout) -> Self {
        Self {
            users_tsv: layout.snapshot(Entity::Users).tsv,
            service_point_users_json: layout.snapshot(Entity::ServicePointUsers).json,
            service_points_json: layout.snapshot(Entity::ServicePoints).json,
            output: layout.merged_report(),
        }
    }
}

/// Inputs and output of the non-staff enrichment.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Service-point assignments snapshot (JSON)
    pub service_point_users_json: PathBuf,
    pub output: PathBuf,
    /// Users in this patron group are skipped
    pub excluded_patron_group: String,
}

impl EnrichConfig {
    pub fn from_layout(layout: &OutputLayout, excluded_patron_group: impl Into<String>) -> Self {
        Self {
            service_point_users_json: layout.snapshot(Entity::ServicePointUsers).json,
            output: layout.non_staff_report(),
            excluded_patron_group: excluded_patron_group.into(),
        }
    }
}
