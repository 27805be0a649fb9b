//! File names of every stage's inputs and outputs under one output root

use std::path::{Path, PathBuf};

use crate::entity::Entity;

/// The three files written for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub json: PathBuf,
    pub tsv: PathBuf,
    pub ids: PathBuf,
}

/// Output root shared by all stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot(&self, entity: Entity) -> SnapshotPaths {
        let stem = entity.file_stem();
        SnapshotPaths {
            json: self.root.join(format!("{stem}.json")),
            tsv: self.root.join(format!("{stem}.tsv")),
            ids: self.root.join(entity.ids_file()),
        }
    }

    /// Assignments restricted to the staff user list
    pub fn filtered_service_point_users(&self) -> SnapshotPaths {
        SnapshotPaths {
            json: self.root.join("service_point_users_filtered.json"),
            tsv: self.root.join("service_point_users_filtered.tsv"),
            ids: self.root.join("service_point_user_ids_filtered.tsv"),
        }
    }

    /// Staff users with their service point names
    pub fn merged_report(&self) -> PathBuf {
        self.root.join("users_with_service_points.tsv")
    }

    /// Non-staff users holding service point assignments
    pub fn non_staff_report(&self) -> PathBuf {
        self.root.join("non_staff_with_service_points.tsv")
    }
}
