//! Startup configuration
//!
//! Defaults come from `constants`; any of them can be overridden through
//! process environment variables. Nothing is read from or written to disk.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::constants::{
    API_KEY_KEY, BASE_URL_KEY, DEFAULT_LOG_FILE, DEFAULT_REGISTRY_URL,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::environment::EnvironmentStore;
use crate::models::{CollisionPolicy, NetworkId};

pub const ENV_REGISTRY_URL: &str = "CONSOLE_REGISTRY_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "CONSOLE_REQUEST_TIMEOUT_SECS";
pub const ENV_LOG_FILE: &str = "CONSOLE_LOG_FILE";
pub const ENV_NETWORK: &str = "CONSOLE_NETWORK";
pub const ENV_COLLISION_POLICY: &str = "CONSOLE_COLLISION_POLICY";

#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    pub registry_url: String,
    pub request_timeout: Duration,
    pub log_file: PathBuf,
    pub initial_network: NetworkId,
    pub collision_policy: CollisionPolicy,
    /// Seed variables, `CONSOLE_<NETWORK>_BASE_URL` / `_API_KEY` applied
    pub environments: EnvironmentStore,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            initial_network: NetworkId::default(),
            collision_policy: CollisionPolicy::default(),
            environments: EnvironmentStore::with_defaults(),
        }
    }
}

impl ConsoleConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConsoleConfig::default();

        if let Some(url) = lookup(ENV_REGISTRY_URL) {
            reqwest::Url::parse(&url)
                .with_context(|| format!("{} is not a valid URL: {}", ENV_REGISTRY_URL, url))?;
            config.registry_url = url;
        }

        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_REQUEST_TIMEOUT))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(path) = lookup(ENV_LOG_FILE) {
            config.log_file = PathBuf::from(path);
        }

        if let Some(network) = lookup(ENV_NETWORK) {
            config.initial_network = network
                .parse()
                .map_err(|e: String| anyhow!(e))
                .with_context(|| format!("invalid {}", ENV_NETWORK))?;
        }

        if let Some(policy) = lookup(ENV_COLLISION_POLICY) {
            config.collision_policy = match policy.trim().to_ascii_lowercase().as_str() {
                "overwrite" => CollisionPolicy::OverwriteOnCollision,
                "reject" => CollisionPolicy::Reject,
                other => {
                    return Err(anyhow!(
                        "{} must be `overwrite` or `reject`, got `{}`",
                        ENV_COLLISION_POLICY,
                        other
                    ))
                }
            };
        }

        for network in NetworkId::ALL {
            let prefix = format!("CONSOLE_{}", network.as_str().to_ascii_uppercase());
            if let Some(base) = lookup(&format!("{}_{}", prefix, BASE_URL_KEY)) {
                config.environments.set_variable(network, BASE_URL_KEY, base);
            }
            if let Some(key) = lookup(&format!("{}_{}", prefix, API_KEY_KEY)) {
                config.environments.set_variable(network, API_KEY_KEY, key);
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = ConsoleConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.registry_url, "https://kmonitor.onrender.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.initial_network, NetworkId::Testnet);
        assert_eq!(config.collision_policy, CollisionPolicy::OverwriteOnCollision);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = ConsoleConfig::from_lookup(lookup(&[
            ("CONSOLE_REGISTRY_URL", "http://localhost:4000/api"),
            ("CONSOLE_REQUEST_TIMEOUT_SECS", "5"),
            ("CONSOLE_NETWORK", "kipaji"),
            ("CONSOLE_COLLISION_POLICY", "reject"),
            ("CONSOLE_PUBLIC_API_KEY", "live-token"),
        ]))
        .unwrap();
        assert_eq!(config.registry_url, "http://localhost:4000/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.initial_network, NetworkId::Kipaji);
        assert_eq!(config.collision_policy, CollisionPolicy::Reject);
        assert_eq!(config.environments.api_key(NetworkId::Public), "live-token");
        assert_eq!(config.environments.api_key(NetworkId::Testnet), "test_1234567890");
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(ConsoleConfig::from_lookup(lookup(&[("CONSOLE_REQUEST_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ConsoleConfig::from_lookup(lookup(&[("CONSOLE_NETWORK", "mainnet")])).is_err());
        assert!(ConsoleConfig::from_lookup(lookup(&[("CONSOLE_REGISTRY_URL", "nope")])).is_err());
    }
}
