//! Okapi session token cache.
//!
//! The gateway gives no expiry with the token, so a cached token is
//! revalidated with a cheap authenticated probe before every reuse.

use serde_json::json;

use crate::config::OkapiConfig;
use crate::error::ApiError;
use crate::http::{TOKEN_HEADER, Transport, clip, join_url, okapi_headers};

const LOGIN_PATH: &str = "authn/login";

/// Cheap authenticated endpoint used as validity probe
const PROBE_PATH: &str = "users";

/// Okapi answers a successful login with 201 Created
const LOGIN_CREATED: u16 = 201;

/// In-memory token cache for one tenant.
pub struct TokenCache {
    config: OkapiConfig,
    token: Option<String>,
    logins: usize,
}

impl TokenCache {
    pub fn new(config: OkapiConfig) -> Self {
        Self {
            config,
            token: None,
            logins: 0,
        }
    }

    pub fn config(&self) -> &OkapiConfig {
        &self.config
    }

    /// Number of login requests issued so far
    pub fn logins(&self) -> usize {
        self.logins
    }

    /// Drop the cached token; the next `get_token` logs in again.
    pub fn invalidate(&mut self) {
        self.token = None;
    }

    /// Return a token the gateway currently accepts.
    ///
    /// Logs in on first use, or when the probe gets an explicit 401.
    pub fn get_token<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<String, ApiError> {
        if let Some(token) = self.token.as_deref() {
            if self.probe(transport, token) {
                return Ok(token.to_string());
            }
            log::info!("Session token rejected, logging in again");
        }
        let token = self.login(transport)?;
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Only an explicit 401 counts as invalid. Probe failures of any other
    /// kind keep the token so a flaky network does not force a re-login.
    fn probe<T: Transport + ?Sized>(&self, transport: &T, token: &str) -> bool {
        let headers = match okapi_headers(&self.config.tenant, Some(token)) {
            Ok(h) => h,
            Err(e) => {
                log::warn!("Cannot send cached token: {e}");
                return false;
            }
        };
        let url = join_url(&self.config.base_url, PROBE_PATH);
        match transport.get(&url, &headers, &[("limit", "1".to_string())]) {
            Ok(resp) => resp.status != 401,
            Err(e) => {
                log::warn!("Token probe failed, keeping cached token: {e}");
                true
            }
        }
    }

    fn login<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<String, ApiError> {
        let url = join_url(&self.config.base_url, LOGIN_PATH);
        let headers = okapi_headers(&self.config.tenant, None)?;
        let payload = json!({
            "username": self.config.username,
            "password": self.config.password,
        });

        log::debug!(
            "Logging in to {} as {} (tenant {})",
            self.config.base_url,
            self.config.username,
            self.config.tenant
        );
        self.logins += 1;
        let resp = transport.post_json(&url, &headers, &payload)?;

        if resp.status != LOGIN_CREATED {
            return Err(ApiError::Auth {
                status: resp.status,
                body: clip(&resp.body),
            });
        }
        match resp.header(TOKEN_HEADER) {
            Some(token) if !token.is_empty() => {
                log::info!("Logged in to tenant {}", self.config.tenant);
                Ok(token.to_string())
            }
            _ => Err(ApiError::Auth {
                status: resp.status,
                body: format!("response has no {TOKEN_HEADER} header"),
            }),
        }
    }
}
