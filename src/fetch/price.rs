use reqwest::blocking::Client;

use crate::error::Result;

use super::request::{build_client, price_url, ClientTimeouts};
use super::{FetchFailure, FetchOutcome, ItemId, PriceSource};

/// Prices an item by issuing one blocking `GET <endpoint>/<item>` per call.
pub struct HttpPriceFetcher {
    client: Client,
}

impl HttpPriceFetcher {
    pub fn new(timeouts: ClientTimeouts) -> Result<Self> {
        Ok(Self::with_client(build_client(timeouts)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn request_price(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(err) => return FetchOutcome::Failed(FetchFailure::Transport(err.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failed(FetchFailure::Status(status.as_u16()));
        }

        match response.text() {
            Ok(body) => parse_price(&body),
            Err(err) => FetchOutcome::Failed(FetchFailure::Transport(err.to_string())),
        }
    }
}

impl PriceSource for HttpPriceFetcher {
    fn fetch(&self, endpoint: &str, item: &ItemId) -> FetchOutcome {
        let url = price_url(endpoint, item);
        let outcome = self.request_price(&url);

        match &outcome {
            FetchOutcome::Price(price) => {
                log::info!("Found price:{price} for item:{item} in url:{url}")
            }
            FetchOutcome::Failed(reason) => {
                log::warn!("No price for item:{item} in url:{url}: {reason}")
            }
        }

        outcome
    }
}

/// Interpret a response body as a non-negative decimal price.
pub fn parse_price(body: &str) -> FetchOutcome {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return FetchOutcome::Failed(FetchFailure::EmptyBody);
    }

    match trimmed.parse::<u64>() {
        Ok(price) => FetchOutcome::Price(price),
        Err(_) => FetchOutcome::Failed(FetchFailure::Malformed(trimmed.to_string())),
    }
}
