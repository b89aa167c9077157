//! Network actor - runs target requests and registry calls in the Tokio runtime

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::NetworkId;
use crate::network::client::execute_request;
use crate::registry::{sync, RegistryClient};

/// Network actor that processes request and registry commands
pub struct NetworkActor {
    client: reqwest::Client,
    registry: RegistryClient,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
    /// One lock per network so a mutation and its refetch run as a unit
    registry_locks: HashMap<NetworkId, Arc<Mutex<()>>>,
}

impl NetworkActor {
    pub fn new(
        client: reqwest::Client,
        registry: RegistryClient,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            client,
            registry,
            response_tx,
            active_requests: JoinSet::new(),
            registry_locks: HashMap::new(),
        }
    }

    fn registry_lock(&mut self, network: NetworkId) -> Arc<Mutex<()>> {
        self.registry_locks.entry(network).or_default().clone()
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                // Handle incoming commands
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::ExecuteRequest { id, request }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();

                            self.active_requests.spawn(async move {
                                tracing::info!(id, url = %request.url, method = request.method.as_str(), network = %request.network, "Executing request");
                                let record = execute_request(&client, &request).await;
                                tracing::info!(id, status = record.status, kind = ?record.kind, elapsed_ms = record.elapsed_ms, "Request completed");
                                let _ = response_tx.send(NetworkResponse::RequestCompleted { id, record });
                            });
                        }

                        Some(NetworkCommand::RefreshRegistry { id, network }) => {
                            let response_tx = self.response_tx.clone();
                            let registry = self.registry.clone();
                            let lock = self.registry_lock(network);

                            self.active_requests.spawn(async move {
                                let _guard = lock.lock().await;
                                let response = match sync::refresh(&registry, network).await {
                                    Ok(collections) => NetworkResponse::RegistryLoaded { id, network, registry: collections },
                                    Err(error) => {
                                        tracing::warn!(id, %network, %error, "Registry refresh failed");
                                        NetworkResponse::RegistryFailed { id, network, action: "refresh".to_string(), error }
                                    }
                                };
                                let _ = response_tx.send(response);
                            });
                        }

                        Some(NetworkCommand::MutateRegistry { id, network, mutation }) => {
                            let response_tx = self.response_tx.clone();
                            let registry = self.registry.clone();
                            let lock = self.registry_lock(network);

                            self.active_requests.spawn(async move {
                                let _guard = lock.lock().await;
                                let action = mutation.describe();
                                tracing::info!(id, %network, action = %action, "Applying registry mutation");
                                let response = match sync::apply(&registry, network, &mutation).await {
                                    Ok(collections) => NetworkResponse::RegistryLoaded { id, network, registry: collections },
                                    Err(error) => {
                                        tracing::warn!(id, %network, action = %action, %error, "Registry mutation failed");
                                        NetworkResponse::RegistryFailed { id, network, action, error }
                                    }
                                };
                                let _ = response_tx.send(response);
                            });
                        }

                        Some(NetworkCommand::Shutdown) => {
                            self.active_requests.abort_all();
                            break;
                        }

                        None => break,
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {
                    // Task completed - results were already sent by the task
                }
            }
        }
    }
}
