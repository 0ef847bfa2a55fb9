use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_HUBSPOT_ENDPOINT: &str = "https://api.hubapi.com";
pub const DEFAULT_PORT: u16 = 8000;

/// Process-wide settings, built once at startup and handed to the router.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Shared secret expected in `x-api-key`. `None` disables the check.
    pub inbound_api_key: Option<String>,
    pub hubspot: HubSpotConfig,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HubSpotConfig {
    pub endpoint: String,
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inbound_api_key: None,
            hubspot: HubSpotConfig::default(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_HUBSPOT_ENDPOINT.to_string(),
            token: None,
        }
    }
}

/// Values coming from the command line or environment. Anything set here
/// wins over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub inbound_api_key: Option<String>,
    pub hubspot_token: Option<String>,
    pub hubspot_endpoint: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&config_str)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config.normalized())
    }

    /// Loads the optional file, then layers CLI/env values on top.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_overrides(overrides))
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(key) = overrides.inbound_api_key {
            self.inbound_api_key = Some(key);
        }
        if let Some(token) = overrides.hubspot_token {
            self.hubspot.token = Some(token);
        }
        if let Some(endpoint) = overrides.hubspot_endpoint {
            self.hubspot.endpoint = endpoint;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        self.normalized()
    }

    // Empty secrets behave exactly like missing ones.
    fn normalized(mut self) -> Self {
        self.inbound_api_key = non_empty(self.inbound_api_key);
        self.hubspot.token = non_empty(self.hubspot.token);
        let endpoint = self.hubspot.endpoint.trim().trim_end_matches('/');
        self.hubspot.endpoint = if endpoint.is_empty() {
            DEFAULT_HUBSPOT_ENDPOINT.to_string()
        } else {
            endpoint.to_string()
        };
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_secrets_unset() {
        let config = Config::load(None, Overrides::default()).unwrap();
        assert!(config.inbound_api_key.is_none());
        assert!(config.hubspot.token.is_none());
        assert_eq!(config.hubspot.endpoint, DEFAULT_HUBSPOT_ENDPOINT);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn parses_partial_yaml() {
        let config = Config::from_yaml(
            "inbound_api_key: s3cret\nhubspot:\n  token: pat-na1-abc\n",
        )
        .unwrap();
        assert_eq!(config.inbound_api_key.as_deref(), Some("s3cret"));
        assert_eq!(config.hubspot.token.as_deref(), Some("pat-na1-abc"));
        assert_eq!(config.hubspot.endpoint, DEFAULT_HUBSPOT_ENDPOINT);
    }

    #[test]
    fn overrides_win_over_file_values() {
        let config = Config::from_yaml("port: 9000\nhubspot:\n  endpoint: http://file\n")
            .unwrap()
            .with_overrides(Overrides {
                hubspot_endpoint: Some("http://cli/".to_string()),
                hubspot_token: Some("tok".to_string()),
                ..Overrides::default()
            });
        assert_eq!(config.port, 9000);
        assert_eq!(config.hubspot.endpoint, "http://cli");
        assert_eq!(config.hubspot.token.as_deref(), Some("tok"));
    }

    #[test]
    fn empty_secrets_count_as_missing() {
        let config = Config::default().with_overrides(Overrides {
            inbound_api_key: Some(String::new()),
            hubspot_token: Some(String::new()),
            ..Overrides::default()
        });
        assert!(config.inbound_api_key.is_none());
        assert!(config.hubspot.token.is_none());
    }

    #[test]
    fn whitespace_secrets_are_kept() {
        let config = Config::default().with_overrides(Overrides {
            inbound_api_key: Some("  ".to_string()),
            hubspot_token: Some(" ".to_string()),
            ..Overrides::default()
        });
        assert_eq!(config.inbound_api_key.as_deref(), Some("  "));
        assert_eq!(config.hubspot.token.as_deref(), Some(" "));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = Config::from_file(Path::new("/nonexistent/ticket-status.yml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
