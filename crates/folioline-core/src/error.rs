//! Error type for Okapi API calls

/// Error from a single request against the Okapi gateway.
///
/// `Http` covers both non-success statuses and connection-level failures
/// (the latter carry no status). `Auth` is only produced by login and is
/// always fatal for the job.
#[derive(Debug)]
pub enum ApiError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Login rejected by the gateway
    Auth { status: u16, body: String },
    /// Response body was not the JSON we expected
    Decode(String),
    /// Tenant or token cannot be sent as a header value
    Header(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "connection error: {message}"),
            Self::Auth { status, body } => write!(f, "login failed ({status}): {body}"),
            Self::Decode(msg) => write!(f, "invalid response body: {msg}"),
            Self::Header(msg) => write!(f, "invalid header value: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create HTTP error from reqwest error.
    ///
    /// The URL is stripped so query strings never reach the logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.without_url().to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::Auth { status, .. } => Some(*status),
            Self::Decode(_) | Self::Header(_) => None,
        }
    }

    /// True for an explicit 401 from the gateway.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_err(status: u16) -> ApiError {
        ApiError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn display_http_with_status() {
        assert_eq!(format!("{}", http_err(404)), "HTTP 404: test");
    }

    #[test]
    fn display_connection_error() {
        let err = ApiError::Http {
            status: None,
            message: "refused".to_string(),
        };
        assert_eq!(format!("{err}"), "connection error: refused");
    }

    #[test]
    fn display_auth() {
        let err = ApiError::Auth {
            status: 422,
            body: "bad password".to_string(),
        };
        assert_eq!(format!("{err}"), "login failed (422): bad password");
    }

    #[test]
    fn unauthorized_only_for_401() {
        assert!(http_err(401).is_unauthorized());
        assert!(!http_err(403).is_unauthorized());
        assert!(!ApiError::Decode("x".into()).is_unauthorized());
    }

    #[test]
    fn decode_from_serde() {
        let e = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(ApiError::from(e), ApiError::Decode(_)));
    }
}
