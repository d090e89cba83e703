//! Provider address and credentials, fixed at client construction.

use std::env;

pub const DEFAULT_BASE_URL: &str = "https://www.inaturalist.org";
pub const DEFAULT_USER_AGENT: &str = concat!("naturalist-core/", env!("CARGO_PKG_VERSION"));

/// Immutable configuration shared by every request a client builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    access_token: Option<String>,
    user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Read configuration from `NATURALIST_BASE_URL`,
    /// `NATURALIST_ACCESS_TOKEN` and `NATURALIST_USER_AGENT`.
    pub fn from_env() -> Self {
        let base_url =
            env::var("NATURALIST_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url);

        if let Ok(token) = env::var("NATURALIST_ACCESS_TOKEN") {
            if !token.trim().is_empty() {
                config = config.with_access_token(token.trim());
            }
        }
        if let Ok(user_agent) = env::var("NATURALIST_USER_AGENT") {
            config = config.with_user_agent(&user_agent);
        }
        config
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = ClientConfig::new("http://localhost:3000//");
        assert_eq!(config.base_url(), "http://localhost:3000");
    }

    #[test]
    fn defaults_point_at_the_public_provider() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert!(config.access_token().is_none());
        assert!(config.user_agent().starts_with("naturalist-core/"));
    }

    #[test]
    fn builders_set_credentials() {
        let config = ClientConfig::new("http://localhost")
            .with_access_token("secret")
            .with_user_agent("field-notes/2.0");
        assert_eq!(config.access_token(), Some("secret"));
        assert_eq!(config.user_agent(), "field-notes/2.0");
    }
}
