//! Network messages - communication between App and Network layers

use crate::error::RegistryError;
use crate::models::{CollectionRegistry, NetworkId, ResponseRecord};
use crate::network::builder::BuiltRequest;
use crate::registry::RegistryMutation;

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Send a built request to the target service
    ExecuteRequest { id: u64, request: BuiltRequest },
    /// Refetch the registry slice for a network
    RefreshRegistry { id: u64, network: NetworkId },
    /// Write to the registry, then refetch
    MutateRegistry {
        id: u64,
        network: NetworkId,
        mutation: RegistryMutation,
    },
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// The target answered, or failed to answer
    RequestCompleted { id: u64, record: ResponseRecord },
    /// Fresh registry contents after a refresh or a mutation
    RegistryLoaded {
        id: u64,
        network: NetworkId,
        registry: CollectionRegistry,
    },
    /// A registry call failed; the cache must stay as it is
    RegistryFailed {
        id: u64,
        network: NetworkId,
        action: String,
        error: RegistryError,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::RequestCompleted { id, .. } => *id,
            NetworkResponse::RegistryLoaded { id, .. } => *id,
            NetworkResponse::RegistryFailed { id, .. } => *id,
        }
    }
}
