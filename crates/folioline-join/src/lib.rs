//! folioline-join: reports built from earlier snapshots
//!
//! `merge` decorates the staff users table with service point names from
//! two JSON snapshots. `enrich` walks the assignments and reports users
//! outside the staff patron group, resolving names on the gateway.

mod config;
pub mod enrich;
pub mod lookup;
pub mod merge;

pub use config::{EnrichConfig, JoinConfig};
pub use enrich::EnrichSummary;
pub use merge::{JoinSummary, run};
