//! Registry layer - cached view of the remote Endpoint Registry Service
//!
//! The cache is a mirror, not a source of truth: every write goes to the
//! service first and is followed by a full refetch.

pub mod cache;
pub mod client;
pub mod sync;

pub use cache::{normalize_collection_key, EndpointDraft, RegistryCache};
pub use client::RegistryClient;
pub use sync::RegistryMutation;
