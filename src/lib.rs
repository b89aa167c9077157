//! # Stellar API Test Console
//!
//! A terminal console for exercising the HTTP APIs of the Stellar networks
//! (testnet, public, kipaji).
//!
//! ## Features
//! - Per-network environment variables (`BASE_URL`, `API_KEY`, custom keys)
//! - Endpoint collections kept in a remote registry, with create / rename /
//!   delete of collections and endpoints
//! - Request body and header editing, JSON syntax highlighting
//! - Pretty / raw / headers response views
//! - History of the last 10 requests, with replay
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (Console state machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod history;
pub mod messages;
pub mod models;
pub mod network;
pub mod registry;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, ConsolePhase, ConsoleState};
pub use config::ConsoleConfig;
pub use environment::{EnvironmentStore, EnvironmentVariableSet};
pub use error::{EnvironmentError, PreflightError, RegistryError};
pub use history::HistoryLedger;
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{
    CollectionRegistry, CollisionPolicy, EndpointDescriptor, HistoryEntry, HttpMethod, NetworkId,
    ResponseRecord,
};
pub use network::{build_request, execute_request, NetworkActor};
pub use registry::{RegistryCache, RegistryClient, RegistryMutation};
