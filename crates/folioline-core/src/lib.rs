//! Folioline Core - Okapi access for library-services export jobs
//!
//! Token caching, offset/limit pagination and the HTTP transport seam
//! shared by every job, plus logging and progress plumbing.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod paginate;
pub mod progress;
#[cfg(feature = "testing")]
pub mod testing;

// Re-exports for convenience
pub use auth::TokenCache;
pub use client::OkapiClient;
pub use config::OkapiConfig;
pub use error::ApiError;
pub use http::{ApiResponse, HttpConfig, HttpTransport, SHARED_RUNTIME, Transport};
pub use logging::{IndicatifLogger, init_logging};
pub use paginate::{DEFAULT_PAGE_SIZE, FetchOutcome, PageRequest, fetch_all};
pub use progress::{ProgressContext, fmt_num};
pub use reqwest::header::HeaderMap;
