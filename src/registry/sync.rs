//! Mutate-then-refresh protocol against the registry
//!
//! Every mutation is followed by a full refetch; the caller replaces its
//! cache with whatever comes back. A failed step aborts the unit and returns
//! the error without touching any local state.

use crate::error::RegistryError;
use crate::models::{CollectionRegistry, EndpointDescriptor, EndpointIdentity, NetworkId};
use crate::registry::client::RegistryClient;

/// A single registry write, validated and ready to send
#[derive(Clone, Debug, PartialEq)]
pub enum RegistryMutation {
    /// Create or replace a collection with an empty endpoint list
    CreateCollection { name: String },
    /// Write `endpoints` under `to`, then delete `from`
    RenameCollection {
        from: String,
        to: String,
        endpoints: Vec<EndpointDescriptor>,
    },
    DeleteCollection { name: String },
    /// Write `endpoint`; when an edit changed its method or path, the old
    /// identity in `replaces` is deleted afterwards
    UpsertEndpoint {
        collection: String,
        endpoint: EndpointDescriptor,
        replaces: Option<EndpointIdentity>,
    },
    DeleteEndpoint {
        collection: String,
        identity: EndpointIdentity,
    },
}

impl RegistryMutation {
    /// Short human description for the status line and logs
    pub fn describe(&self) -> String {
        match self {
            RegistryMutation::CreateCollection { name } => format!("create collection {}", name),
            RegistryMutation::RenameCollection { from, to, .. } => {
                format!("rename collection {} to {}", from, to)
            }
            RegistryMutation::DeleteCollection { name } => format!("delete collection {}", name),
            RegistryMutation::UpsertEndpoint { collection, endpoint, .. } => format!(
                "save {} {} in {}",
                endpoint.method.as_str(),
                endpoint.path,
                collection
            ),
            RegistryMutation::DeleteEndpoint { collection, identity } => format!(
                "delete {} {} from {}",
                identity.method.as_str(),
                identity.path,
                collection
            ),
        }
    }
}

/// Fetch the whole registry slice for `network`
pub async fn refresh(
    client: &RegistryClient,
    network: NetworkId,
) -> Result<CollectionRegistry, RegistryError> {
    client.fetch(network).await
}

/// Run one mutation, then refetch so the result reflects it
pub async fn apply(
    client: &RegistryClient,
    network: NetworkId,
    mutation: &RegistryMutation,
) -> Result<CollectionRegistry, RegistryError> {
    match mutation {
        RegistryMutation::CreateCollection { name } => {
            client.put_collection(network, name, &[]).await?;
        }
        RegistryMutation::RenameCollection { from, to, endpoints } => {
            if from != to {
                client.put_collection(network, to, endpoints).await?;
                client.remove_collection(network, from).await?;
            }
        }
        RegistryMutation::DeleteCollection { name } => {
            client.remove_collection(network, name).await?;
        }
        RegistryMutation::UpsertEndpoint {
            collection,
            endpoint,
            replaces,
        } => {
            client.upsert_endpoint(network, collection, endpoint).await?;
            if let Some(old) = replaces {
                client.remove_endpoint(network, collection, old).await?;
            }
        }
        RegistryMutation::DeleteEndpoint { collection, identity } => {
            client.remove_endpoint(network, collection, identity).await?;
        }
    }

    refresh(client, network).await
}
