//! Okapi API client: transport + token cache

use indicatif::ProgressBar;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::auth::TokenCache;
use crate::config::OkapiConfig;
use crate::error::ApiError;
use crate::http::{HttpConfig, HttpTransport, Transport, join_url, okapi_headers};
use crate::paginate::{FetchOutcome, PageRequest, fetch_all};

/// Client for one tenant. Each job builds its own.
pub struct OkapiClient<T = HttpTransport> {
    transport: T,
    tokens: TokenCache,
}

impl OkapiClient<HttpTransport> {
    /// Client over a real reqwest transport
    pub fn connect(config: OkapiConfig, http: HttpConfig) -> Result<Self, ApiError> {
        Ok(Self::new(config, HttpTransport::new(http)?))
    }
}

impl<T: Transport> OkapiClient<T> {
    pub fn new(config: OkapiConfig, transport: T) -> Self {
        Self {
            transport,
            tokens: TokenCache::new(config),
        }
    }

    pub fn config(&self) -> &OkapiConfig {
        self.tokens.config()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Login requests issued by this client so far
    pub fn logins(&self) -> usize {
        self.tokens.logins()
    }

    pub fn token(&mut self) -> Result<String, ApiError> {
        self.tokens.get_token(&self.transport)
    }

    /// Tenant + freshly validated token headers
    pub fn auth_headers(&mut self) -> Result<HeaderMap, ApiError> {
        let token = self.token()?;
        okapi_headers(&self.config().tenant, Some(&token))
    }

    /// Paginate one collection.
    ///
    /// `Err` only when no token can be obtained; page failures are reported
    /// through [`FetchOutcome::error`].
    pub fn fetch_all(
        &mut self,
        request: &PageRequest,
        pb: &ProgressBar,
    ) -> Result<FetchOutcome, ApiError> {
        let headers = self.auth_headers()?;
        Ok(fetch_all(
            &self.transport,
            &self.config().base_url,
            &headers,
            request,
            pb,
        ))
    }

    /// GET a single record, e.g. `users/{id}`.
    ///
    /// Anything but 200 with a JSON body is logged and yields `None`.
    pub fn get_record(&self, headers: &HeaderMap, path: &str) -> Option<Value> {
        let url = join_url(&self.config().base_url, path);
        let result = self
            .transport
            .get(&url, headers, &[])
            .and_then(|resp| match resp.status {
                200 => resp.json(),
                status => Err(ApiError::Http {
                    status: Some(status),
                    message: format!("GET {path}"),
                }),
            });
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Lookup {path} failed: {e}");
                None
            }
        }
    }
}
