use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{Context, Result};

use super::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub connect: Duration,
    pub request: Option<Duration>,
}

/// Join an endpoint base and an item identifier into `<base>/<item>`.
pub fn price_url(endpoint: &str, item: &ItemId) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), item)
}

/// Build the shared blocking client used by every worker thread.
pub fn build_client(timeouts: ClientTimeouts) -> Result<Client> {
    // `None` clears the blocking client's built-in 30s total timeout.
    Ok(Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .build()
        .context("Failed to construct blocking HTTP client")?)
}
