//! Per-network environment variables
//!
//! Each network owns exactly one variable set. `BASE_URL` and `API_KEY` feed
//! request construction; anything else is stored and editable only.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::constants::{API_KEY_KEY, BASE_URL_KEY, DEFAULT_TARGET_HOST, MASKED_VALUE};
use crate::error::EnvironmentError;
use crate::models::{CollisionPolicy, NetworkId};

/// Variable name -> value, in insertion order
pub type EnvironmentVariableSet = IndexMap<String, String>;

/// Holds one variable set per network
#[derive(Clone, Debug, Default)]
pub struct EnvironmentStore {
    sets: HashMap<NetworkId, EnvironmentVariableSet>,
    policy: CollisionPolicy,
}

impl EnvironmentStore {
    /// Empty store, no network initialized
    pub fn new() -> Self {
        EnvironmentStore::default()
    }

    /// Store seeded with `BASE_URL` and `API_KEY` for every network
    pub fn with_defaults() -> Self {
        let mut store = EnvironmentStore::new();
        for network in NetworkId::ALL {
            let prefix = match network {
                NetworkId::Testnet => "test",
                NetworkId::Public => "prod",
                NetworkId::Kipaji => "kipaji",
            };
            store.set_variable(network, BASE_URL_KEY, format!("{}/{}", DEFAULT_TARGET_HOST, network));
            store.set_variable(network, API_KEY_KEY, format!("{}_1234567890", prefix));
        }
        store
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Snapshot of a network's variables; empty if the network was never set up
    pub fn get(&self, network: NetworkId) -> EnvironmentVariableSet {
        self.sets.get(&network).cloned().unwrap_or_default()
    }

    pub fn value(&self, network: NetworkId, key: &str) -> Option<&String> {
        self.sets.get(&network).and_then(|set| set.get(key))
    }

    pub fn base_url(&self, network: NetworkId) -> &str {
        self.value(network, BASE_URL_KEY).map(String::as_str).unwrap_or("")
    }

    pub fn api_key(&self, network: NetworkId) -> &str {
        self.value(network, API_KEY_KEY).map(String::as_str).unwrap_or("")
    }

    pub fn set_variable(&mut self, network: NetworkId, key: impl Into<String>, value: impl Into<String>) {
        self.sets.entry(network).or_default().insert(key.into(), value.into());
    }

    /// Add a new variable. An existing key is overwritten unless the policy
    /// is `Reject`.
    pub fn add_variable(
        &mut self,
        network: NetworkId,
        key: &str,
        value: impl Into<String>,
    ) -> Result<(), EnvironmentError> {
        if key.is_empty() {
            return Err(EnvironmentError::EmptyKey);
        }
        if self.value(network, key).is_some() && self.policy == CollisionPolicy::Reject {
            return Err(EnvironmentError::KeyExists(key.to_string()));
        }
        self.set_variable(network, key, value);
        Ok(())
    }

    /// Remove-then-add. With `OverwriteOnCollision` an existing `new_key`
    /// loses its previous value.
    pub fn rename_variable(
        &mut self,
        network: NetworkId,
        old_key: &str,
        new_key: &str,
    ) -> Result<(), EnvironmentError> {
        if new_key.is_empty() {
            return Err(EnvironmentError::EmptyKey);
        }
        if old_key == new_key {
            return Ok(());
        }
        let Some(set) = self.sets.get_mut(&network) else {
            return Ok(());
        };
        if !set.contains_key(old_key) {
            return Ok(());
        }
        if set.contains_key(new_key) && self.policy == CollisionPolicy::Reject {
            return Err(EnvironmentError::KeyExists(new_key.to_string()));
        }

        if let Some(value) = set.shift_remove(old_key) {
            if set.contains_key(new_key) {
                tracing::debug!(%network, key = new_key, "Overwriting variable on rename");
            }
            set.shift_remove(new_key);
            set.insert(new_key.to_string(), value);
        }
        Ok(())
    }

    pub fn remove_variable(&mut self, network: NetworkId, key: &str) {
        if let Some(set) = self.sets.get_mut(&network) {
            set.shift_remove(key);
        }
    }

    /// Mutable handle on one value, used by the in-place editor
    pub fn value_mut(&mut self, network: NetworkId, key: &str) -> Option<&mut String> {
        self.sets.get_mut(&network).and_then(|set| set.get_mut(key))
    }

    /// Key at a display position
    pub fn key_at(&self, network: NetworkId, index: usize) -> Option<&str> {
        self.sets
            .get(&network)
            .and_then(|set| set.get_index(index))
            .map(|(k, _)| k.as_str())
    }

    pub fn len(&self, network: NetworkId) -> usize {
        self.sets.get(&network).map(|set| set.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, network: NetworkId) -> bool {
        self.len(network) == 0
    }

    /// Pairs for read-only display, with secrets masked unless revealed
    pub fn masked_entries(&self, network: NetworkId, reveal: bool) -> Vec<(String, String)> {
        self.sets
            .get(&network)
            .map(|set| {
                set.iter()
                    .map(|(k, v)| (k.clone(), display_value(k, v, reveal)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Presentation of one variable value
pub fn display_value(key: &str, value: &str, reveal: bool) -> String {
    if is_secret(key) && !reveal {
        MASKED_VALUE.to_string()
    } else {
        value.to_string()
    }
}

pub fn is_secret(key: &str) -> bool {
    key == API_KEY_KEY
}

/// Keys request construction depends on; they cannot be removed or renamed
pub fn is_required(key: &str) -> bool {
    key == BASE_URL_KEY || key == API_KEY_KEY
}
