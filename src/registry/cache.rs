//! Local mirror of the registry for the selected network
//!
//! The cache is never edited in place. Mutations are planned here (local
//! validation, merge lists for renames) and sent through `sync::apply`; the
//! refetched registry then replaces the cache wholesale.

use serde_json::Value;

use crate::error::RegistryError;
use crate::models::{
    CollectionRegistry, CollisionPolicy, EndpointDescriptor, EndpointIdentity, HttpMethod,
    NetworkId,
};
use crate::registry::sync::RegistryMutation;

/// Map key for a collection display name: all whitespace removed
pub fn normalize_collection_key(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Endpoint form contents before validation
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointDraft {
    pub method: HttpMethod,
    pub path: String,
    pub description: String,
    pub body_text: String,
}

impl Default for EndpointDraft {
    fn default() -> Self {
        EndpointDraft {
            method: HttpMethod::GET,
            path: String::new(),
            description: String::new(),
            body_text: String::from("{}"),
        }
    }
}

impl EndpointDraft {
    pub fn from_descriptor(endpoint: &EndpointDescriptor) -> Self {
        EndpointDraft {
            method: endpoint.method,
            path: endpoint.path.clone(),
            description: endpoint.description.clone(),
            body_text: endpoint
                .request_body
                .as_ref()
                .and_then(|b| serde_json::to_string_pretty(b).ok())
                .unwrap_or_else(|| String::from("{}")),
        }
    }

    pub fn into_descriptor(self) -> Result<EndpointDescriptor, RegistryError> {
        let path = self.path.trim().to_string();
        if !path.starts_with('/') {
            return Err(RegistryError::Validation(format!(
                "endpoint path must start with '/': {:?}",
                path
            )));
        }
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(RegistryError::Validation(
                "endpoint description must not be empty".to_string(),
            ));
        }
        let request_body = if self.body_text.trim().is_empty() {
            None
        } else {
            let parsed = serde_json::from_str::<Value>(&self.body_text).map_err(|e| {
                RegistryError::Validation(format!("sample body is not valid JSON: {}", e))
            })?;
            Some(parsed)
        };

        Ok(EndpointDescriptor {
            method: self.method,
            path,
            description,
            request_body,
        })
    }
}

/// In-memory registry slice for one network
#[derive(Clone, Debug, Default)]
pub struct RegistryCache {
    network: NetworkId,
    collections: CollectionRegistry,
    policy: CollisionPolicy,
}

impl RegistryCache {
    pub fn new(network: NetworkId) -> Self {
        RegistryCache {
            network,
            collections: CollectionRegistry::new(),
            policy: CollisionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn collections(&self) -> &CollectionRegistry {
        &self.collections
    }

    /// Point the cache at another network, dropping what it held
    pub fn reset(&mut self, network: NetworkId) {
        self.network = network;
        self.collections.clear();
    }

    /// Replace the contents after a refresh. Results for another network are
    /// ignored and `false` is returned.
    pub fn replace(&mut self, network: NetworkId, registry: CollectionRegistry) -> bool {
        if network != self.network {
            return false;
        }
        self.collections = registry;
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    pub fn endpoints(&self, name: &str) -> Option<&[EndpointDescriptor]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    pub fn find(&self, group: &str, method: HttpMethod, path: &str) -> Option<&EndpointDescriptor> {
        self.collections
            .get(group)
            .and_then(|eps| eps.iter().find(|e| e.matches(method, path)))
    }

    /// First collection holding an endpoint with this identity
    pub fn locate(&self, method: HttpMethod, path: &str) -> Option<(&str, &EndpointDescriptor)> {
        self.collections.iter().find_map(|(group, eps)| {
            eps.iter()
                .find(|e| e.matches(method, path))
                .map(|e| (group.as_str(), e))
        })
    }

    /// Collections with only the endpoints matching `term`. A collection whose
    /// name matches keeps all of its endpoints.
    pub fn filter(&self, term: &str) -> Vec<(String, Vec<EndpointDescriptor>)> {
        let needle = term.trim().to_lowercase();
        self.collections
            .iter()
            .filter_map(|(group, eps)| {
                if needle.is_empty() || group.to_lowercase().contains(&needle) {
                    return Some((group.clone(), eps.clone()));
                }
                let matching: Vec<EndpointDescriptor> = eps
                    .iter()
                    .filter(|e| {
                        e.path.to_lowercase().contains(&needle)
                            || e.description.to_lowercase().contains(&needle)
                            || e.method.as_str().to_lowercase() == needle
                    })
                    .cloned()
                    .collect();
                (!matching.is_empty()).then(|| (group.clone(), matching))
            })
            .collect()
    }

    pub fn plan_create_collection(&self, display_name: &str) -> Result<RegistryMutation, RegistryError> {
        let name = normalize_collection_key(display_name);
        if name.is_empty() {
            return Err(RegistryError::Validation(
                "collection name must not be empty".to_string(),
            ));
        }
        if self.contains(&name) && self.policy == CollisionPolicy::Reject {
            return Err(RegistryError::Validation(format!(
                "collection {} already exists",
                name
            )));
        }
        Ok(RegistryMutation::CreateCollection { name })
    }

    /// Renaming onto an existing collection merges: the target keeps its
    /// endpoints and the source's endpoints are appended after them.
    pub fn plan_rename_collection(
        &self,
        from: &str,
        new_display_name: &str,
    ) -> Result<RegistryMutation, RegistryError> {
        let to = normalize_collection_key(new_display_name);
        if to.is_empty() {
            return Err(RegistryError::Validation(
                "collection name must not be empty".to_string(),
            ));
        }
        let source = self.collections.get(from).ok_or_else(|| {
            RegistryError::Validation(format!("collection {} is not loaded", from))
        })?;

        let endpoints = if from == to {
            source.clone()
        } else {
            let mut merged = self.collections.get(&to).cloned().unwrap_or_default();
            if !merged.is_empty() {
                tracing::warn!(from, to = %to, "Rename target exists, merging endpoints");
            }
            merged.extend(source.iter().cloned());
            merged
        };

        Ok(RegistryMutation::RenameCollection {
            from: from.to_string(),
            to,
            endpoints,
        })
    }

    pub fn plan_delete_collection(&self, name: &str) -> Result<RegistryMutation, RegistryError> {
        if !self.contains(name) {
            return Err(RegistryError::Validation(format!(
                "collection {} is not loaded",
                name
            )));
        }
        Ok(RegistryMutation::DeleteCollection {
            name: name.to_string(),
        })
    }

    /// `editing` is the identity the form was opened on, if any. The old
    /// entry is replaced only when it is still cached under another identity.
    pub fn plan_upsert_endpoint(
        &self,
        collection: &str,
        draft: EndpointDraft,
        editing: Option<&EndpointIdentity>,
    ) -> Result<RegistryMutation, RegistryError> {
        if !self.contains(collection) {
            return Err(RegistryError::Validation(format!(
                "collection {} is not loaded",
                collection
            )));
        }
        let endpoint = draft.into_descriptor()?;
        let replaces = editing
            .filter(|old| **old != endpoint.identity())
            .filter(|old| self.find(collection, old.method, &old.path).is_some())
            .cloned();
        Ok(RegistryMutation::UpsertEndpoint {
            collection: collection.to_string(),
            endpoint,
            replaces,
        })
    }

    pub fn plan_delete_endpoint(
        &self,
        collection: &str,
        identity: EndpointIdentity,
    ) -> Result<RegistryMutation, RegistryError> {
        if self.find(collection, identity.method, &identity.path).is_none() {
            return Err(RegistryError::Validation(format!(
                "{} {} is not in {}",
                identity.method.as_str(),
                identity.path,
                collection
            )));
        }
        Ok(RegistryMutation::DeleteEndpoint {
            collection: collection.to_string(),
            identity,
        })
    }
}
