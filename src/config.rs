//! Configuration management for the TOPdesk MCP server.
//!
//! This module handles loading configuration from environment variables,
//! with validation to ensure all required values are present.

use std::env;
use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::error::{TopdeskError, REQUIRED_SETTINGS};

/// Environment variable overriding where the bundled documents are read from.
pub const RESOURCES_DIR_VAR: &str = "TOPDESK_RESOURCES_DIR";

/// Configuration for connecting to TOPdesk.
///
/// The password is stored but never logged or exposed in error messages.
#[derive(Clone)]
pub struct Config {
    /// Base URL for the TOPdesk instance (e.g., `https://company.topdesk.net`).
    pub base_url: String,

    /// Operator login name used for Basic authentication.
    pub username: String,

    /// Application password for the operator.
    /// This value must never be logged or included in error messages.
    pub password: String,

    /// Directory overriding the built-in `fiql_query_howto.md` and
    /// `object_schemas.yaml`.
    pub resources_dir: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("resources_dir", &self.resources_dir)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `TOPDESK_URL`: The base URL of the TOPdesk instance
    /// - `TOPDESK_USERNAME`: The operator login name
    /// - `TOPDESK_PASSWORD`: The operator's application password
    ///
    /// # Errors
    ///
    /// Returns `TopdeskError::Config` naming all three settings if any of them
    /// is missing, or if the URL fails validation.
    pub fn from_env() -> Result<Self, TopdeskError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// `from_env` is this with `std::env::var`; tests pass a map instead so
    /// they never touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TopdeskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_SETTINGS
            .iter()
            .copied()
            .filter(|name| present(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(TopdeskError::missing_credentials(&missing));
        }

        let base_url = Self::validate_base_url(present("TOPDESK_URL").unwrap_or_default())?;
        let username = present("TOPDESK_USERNAME").unwrap_or_default().trim().to_string();
        let password = present("TOPDESK_PASSWORD").unwrap_or_default();

        let resources_dir = present(RESOURCES_DIR_VAR).map(PathBuf::from);

        Ok(Config {
            base_url,
            username,
            password,
            resources_dir,
        })
    }

    /// Validates and normalizes the base URL.
    fn validate_base_url(url: String) -> Result<String, TopdeskError> {
        let url = url.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&url).map_err(|e| {
            TopdeskError::invalid_config(format!("TOPDESK_URL is not a valid URL: {}", e))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(TopdeskError::invalid_config(
                "TOPDESK_URL must start with http:// or https://",
            ));
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const FULL: [(&str, &str); 3] = [
        ("TOPDESK_URL", "https://company.topdesk.net/"),
        ("TOPDESK_USERNAME", "api-operator"),
        ("TOPDESK_PASSWORD", "s3cret-app-pw"),
    ];

    #[test]
    fn test_from_lookup_accepts_complete_settings() {
        let config = Config::from_lookup(lookup_from(&FULL)).unwrap();
        assert_eq!(config.base_url, "https://company.topdesk.net");
        assert_eq!(config.username, "api-operator");
        assert_eq!(config.password, "s3cret-app-pw");
        assert_eq!(config.resources_dir, None);
    }

    #[test]
    fn test_omitting_any_setting_fails_naming_all_three() {
        for skipped in REQUIRED_SETTINGS {
            let pairs: Vec<(&str, &str)> =
                FULL.iter().copied().filter(|(k, _)| *k != skipped).collect();
            let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(err.is_config());
            let msg = err.to_string();
            for name in REQUIRED_SETTINGS {
                assert!(msg.contains(name), "{msg} should mention {name}");
            }
            assert!(msg.contains(&format!("missing: {}", skipped)));
        }
    }

    #[test]
    fn test_blank_setting_counts_as_missing() {
        let pairs = [
            ("TOPDESK_URL", "https://company.topdesk.net"),
            ("TOPDESK_USERNAME", "   "),
            ("TOPDESK_PASSWORD", "pw"),
        ];
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("missing: TOPDESK_USERNAME"));
    }

    #[test]
    fn test_all_missing_lists_every_setting() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err
            .to_string()
            .contains("missing: TOPDESK_URL, TOPDESK_USERNAME, TOPDESK_PASSWORD"));
    }

    #[test]
    fn test_validate_base_url_requires_http_scheme() {
        assert!(Config::validate_base_url("company.topdesk.net".to_string()).is_err());
        assert!(Config::validate_base_url("ftp://company.topdesk.net".to_string()).is_err());
    }

    #[test]
    fn test_resources_dir_override() {
        let mut pairs = FULL.to_vec();
        pairs.push((RESOURCES_DIR_VAR, "/opt/topdesk-mcp/resources"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            config.resources_dir,
            Some(PathBuf::from("/opt/topdesk-mcp/resources"))
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config::from_lookup(lookup_from(&FULL)).unwrap();
        let shown = format!("{:?}", config);
        assert!(!shown.contains("s3cret-app-pw"));
        assert!(shown.contains("[REDACTED]"));
    }
}
