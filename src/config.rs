use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ANILIST_URL: &str = "https://graphql.anilist.co";

/// Connection settings for [`crate::api::AniListClient`].
///
/// Built once at startup and handed to the client by value; nothing in the
/// crate reads it from a global.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: ANILIST_URL.to_string(),
            user_agent: format!("anilist-probe/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_points_at_anilist() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "https://graphql.anilist.co");
        assert!(config.user_agent.starts_with("anilist-probe/"));
    }

    #[test]
    fn test_load_fills_missing_keys_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = \"http://127.0.0.1:9000\"").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9000");
        assert_eq!(config.user_agent, ClientConfig::default().user_agent);
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = ").unwrap();
        assert!(ClientConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file_mentions_path() {
        let err = ClientConfig::load(Path::new("/nonexistent/probe.toml")).unwrap_err();
        assert!(err.to_string().contains("probe.toml"));
    }

    #[test]
    fn test_with_endpoint_overrides_only_endpoint() {
        let config = ClientConfig::default().with_endpoint("http://localhost:1234");
        assert_eq!(config.endpoint, "http://localhost:1234");
        assert_eq!(config.user_agent, ClientConfig::default().user_agent);
    }
}
