//! Folioline Export - snapshot jobs for Okapi collections
//!
//! Each job paginates one collection and writes three files: the raw
//! records as JSON, a flattened TSV with a fixed column table, and a
//! small id TSV that downstream stages use as join keys.

pub mod entity;
pub mod flatten;
pub mod jobs;
pub mod layout;
pub mod snapshot;
pub mod writer;

// Re-exports
pub use entity::{Column, Entity};
pub use flatten::{FlatRow, flatten};
pub use jobs::{
    ExportConfig, JobSummary, fetch_patron_groups, fetch_service_point_users,
    fetch_service_points, fetch_staff, filter_service_point_users, write_snapshot,
};
pub use layout::{OutputLayout, SnapshotPaths};
pub use snapshot::{ServicePoint, ServicePointUser, Table};
