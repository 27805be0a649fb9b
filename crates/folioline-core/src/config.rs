use std::fmt;

/// Connection settings for one Okapi tenant.
#[derive(Clone)]
pub struct OkapiConfig {
    /// Gateway base URL, e.g. `https://okapi.example.org`
    pub base_url: String,
    pub tenant: String,
    pub username: String,
    pub password: String,
}

// Password never shows up in debug output or logs
impl fmt::Debug for OkapiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OkapiConfig")
            .field("base_url", &self.base_url)
            .field("tenant", &self.tenant)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_masks_password() {
        let config = OkapiConfig {
            base_url: "http://localhost:9130".into(),
            tenant: "diku".into(),
            username: "admin".into(),
            password: "hunter2".into(),
        };
        let out = format!("{config:?}");
        assert!(out.contains("diku"));
        assert!(!out.contains("hunter2"));
    }
}
