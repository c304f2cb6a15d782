// ABOUTME: Explicit configuration for the HTTP client.
// ABOUTME: Passed in by the caller instead of relying on ambient defaults.

use std::time::Duration;

/// Configuration for outbound requests (feed fetch and episode downloads).
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("castpull/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
