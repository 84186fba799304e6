//! Shared HTTP Client Module
//!
//! Provides a global, lazy-initialized HTTP client with connection pooling.
//! All generative-language API calls in a run go to the same host, so one
//! client gives TLS session resumption and connection reuse for free.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Global HTTP client for generative-language API calls
///
/// - 120s timeout: generation over a 15k-character excerpt can be slow
/// - small idle pool: the pipeline is strictly sequential
static API_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .expect("Failed to create API HTTP client")
});

/// Get the global API HTTP client
#[inline]
pub fn api_client() -> &'static Client {
    &API_CLIENT
}
