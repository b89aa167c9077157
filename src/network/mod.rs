//! Network layer - request building, execution and registry I/O
//!
//! The Network actor receives commands from the App layer and sends back
//! responses tagged with the command's id.

pub mod actor;
pub mod builder;
pub mod client;

pub use actor::NetworkActor;
pub use builder::{build_request, BuiltRequest};
pub use client::{create_client, execute_request};
