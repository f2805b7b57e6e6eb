//! Configuration module
//!
//! Client configuration for the catalog API, the object-storage service and
//! the upload limits, loaded from the environment (and `.env` when present).

use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BATCH_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STORAGE_FOLDER,
    DUPLICATE_CHECK_LIMIT, MAX_FILES_PER_RESOURCE, MAX_FILE_SIZE_BYTES,
};

const DEFAULT_API_URL: &str = "http://localhost:5000/api/v1";
const DEFAULT_STORAGE_URL: &str = "http://localhost:5000/api/v1/storage";

/// Client-side configuration shared by every Athenaeum binary.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub storage_url: String,
    /// Bearer token for the catalog and analytics endpoints
    pub api_token: Option<String>,
    pub storage_folder: String,
    pub request_timeout_secs: u64,
    pub max_file_size_bytes: u64,
    pub max_files_per_resource: usize,
    pub duplicate_check_limit: u32,
    pub batch_concurrency: usize,
    pub environment: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            api_token: None,
            storage_folder: DEFAULT_STORAGE_FOLDER.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            max_files_per_resource: MAX_FILES_PER_RESOURCE,
            duplicate_check_limit: DUPLICATE_CHECK_LIMIT,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            environment: "development".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. `from_env` uses
    /// the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("ATHENAEUM_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or(defaults.api_url);

        let storage_url = lookup("ATHENAEUM_STORAGE_URL")
            .or_else(|| lookup("STORAGE_URL"))
            .unwrap_or(defaults.storage_url);

        let api_token = lookup("ATHENAEUM_API_TOKEN")
            .or_else(|| lookup("JWT_TOKEN"))
            .filter(|t| !t.trim().is_empty());

        let max_file_size_bytes = match parse_var::<u64, _>(&lookup, "MAX_FILE_SIZE_MB")? {
            Some(mb) => mb.saturating_mul(1024 * 1024),
            None => defaults.max_file_size_bytes,
        };

        let config = Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            storage_url: storage_url.trim_end_matches('/').to_string(),
            api_token,
            storage_folder: lookup("ATHENAEUM_STORAGE_FOLDER").unwrap_or(defaults.storage_folder),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            max_file_size_bytes,
            max_files_per_resource: parse_var(&lookup, "MAX_FILES_PER_RESOURCE")?
                .unwrap_or(defaults.max_files_per_resource),
            duplicate_check_limit: parse_var(&lookup, "DUPLICATE_CHECK_LIMIT")?
                .unwrap_or(defaults.duplicate_check_limit),
            batch_concurrency: parse_var(&lookup, "BATCH_CONCURRENCY")?
                .unwrap_or(defaults.batch_concurrency),
            environment: lookup("ENVIRONMENT")
                .or_else(|| lookup("APP_ENV"))
                .unwrap_or(defaults.environment),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for (name, url) in [
            ("ATHENAEUM_API_URL", &self.api_url),
            ("ATHENAEUM_STORAGE_URL", &self.storage_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!("{} must be an http(s) URL", name));
            }
        }

        if self.storage_folder.trim().is_empty() {
            return Err(anyhow::anyhow!("ATHENAEUM_STORAGE_FOLDER must not be empty"));
        }

        if self.max_file_size_bytes == 0 || self.max_file_size_bytes > MAX_FILE_SIZE_BYTES {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB must be between 1 and {}",
                MAX_FILE_SIZE_BYTES / (1024 * 1024)
            ));
        }

        if self.max_files_per_resource == 0 || self.max_files_per_resource > MAX_FILES_PER_RESOURCE {
            return Err(anyhow::anyhow!(
                "MAX_FILES_PER_RESOURCE must be between 1 and {}",
                MAX_FILES_PER_RESOURCE
            ));
        }

        if self.duplicate_check_limit == 0 {
            return Err(anyhow::anyhow!("DUPLICATE_CHECK_LIMIT must be at least 1"));
        }

        if self.batch_concurrency == 0 {
            return Err(anyhow::anyhow!("BATCH_CONCURRENCY must be at least 1"));
        }

        if self.is_production() && self.api_url.starts_with("http://") {
            return Err(anyhow::anyhow!(
                "ATHENAEUM_API_URL must use https in production"
            ));
        }

        Ok(())
    }

    /// Check if the client is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Bearer token, or an error naming the variables to set.
    pub fn require_token(&self) -> Result<&str, anyhow::Error> {
        self.api_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Missing token. Set ATHENAEUM_API_TOKEN or JWT_TOKEN"))
    }
}

/// Parse a numeric variable; unset is `None`, unparsable is an error.
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, anyhow::Error>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", key, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ClientConfig, anyhow::Error> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.max_file_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.max_files_per_resource, 20);
        assert!(config.require_token().is_err());
    }

    #[test]
    fn overrides_and_fallback_names_are_honoured() {
        let config = load(&[
            ("API_URL", "https://portal.example/api/"),
            ("JWT_TOKEN", "secret"),
            ("MAX_FILE_SIZE_MB", "25"),
            ("MAX_FILES_PER_RESOURCE", "5"),
            ("ATHENAEUM_STORAGE_FOLDER", "library"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://portal.example/api");
        assert_eq!(config.require_token().unwrap(), "secret");
        assert_eq!(config.max_file_size_bytes, 25 * 1024 * 1024);
        assert_eq!(config.max_files_per_resource, 5);
        assert_eq!(config.storage_folder, "library");
    }

    #[test]
    fn limits_above_the_hard_caps_are_rejected() {
        assert!(load(&[("MAX_FILE_SIZE_MB", "500")]).is_err());
        assert!(load(&[("MAX_FILES_PER_RESOURCE", "50")]).is_err());
        assert!(load(&[("MAX_FILE_SIZE_MB", "lots")]).is_err());
    }

    #[test]
    fn unparsable_numbers_are_errors_for_every_limit() {
        for key in [
            "MAX_FILE_SIZE_MB",
            "REQUEST_TIMEOUT_SECS",
            "MAX_FILES_PER_RESOURCE",
            "DUPLICATE_CHECK_LIMIT",
            "BATCH_CONCURRENCY",
        ] {
            let err = load(&[(key, "ten")]).unwrap_err();
            assert!(err.to_string().contains(key), "{}: {}", key, err);
        }
        let config = load(&[("REQUEST_TIMEOUT_SECS", " 45 ")]).unwrap();
        assert_eq!(config.request_timeout_secs, 45);
    }

    #[test]
    fn production_requires_https() {
        assert!(load(&[("ENVIRONMENT", "production")]).is_err());
        assert!(load(&[
            ("ENVIRONMENT", "production"),
            ("ATHENAEUM_API_URL", "https://portal.example/api"),
        ])
        .is_ok());
    }
}
