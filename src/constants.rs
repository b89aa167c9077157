//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default base URL of the Endpoint Registry Service
pub const DEFAULT_REGISTRY_URL: &str = "https://kmonitor.onrender.com/api";

/// Base URL prefix used to seed each network's `BASE_URL`
pub const DEFAULT_TARGET_HOST: &str = "https://kmonitor.onrender.com";

/// Default timeout applied to every outgoing request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "stellar-console.log";

/// Reserved variable holding the target service base URL
pub const BASE_URL_KEY: &str = "BASE_URL";

/// Reserved variable holding the bearer token
pub const API_KEY_KEY: &str = "API_KEY";

/// What a masked secret looks like in read-only views
pub const MASKED_VALUE: &str = "••••••••";

/// Body buffer contents when an endpoint carries no sample body
pub const EMPTY_BODY: &str = "{}";

/// Payload used when the target service never answered
pub const NO_RESPONSE_MESSAGE: &str = "No response received from server";

/// Status sentinel for transport failures
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Status sentinel for local preflight failures
pub const PREFLIGHT_FAILURE_STATUS: u16 = 500;

/// Number of history entries kept per session
pub const MAX_HISTORY: usize = 10;

/// Group name given to requests replayed from history with no cached endpoint
pub const HISTORY_GROUP: &str = "History";

/// Application name
pub const APP_NAME: &str = "Stellar API Test Suite";
