use std::time::Duration;

use crate::fetch::{ClientTimeouts, ItemId, DEFAULT_CONNECT_TIMEOUT_MS};
use crate::gather::{ReadPolicy, DEFAULT_ITEM_TIMEOUT, DEFAULT_POOL_SIZE};

pub mod loader;
pub mod validator;

pub use loader::{load_config, load_items, RawConfig};
pub use validator::validate;

/// Everything a batch run needs, after defaults, file and CLI have been merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub endpoints: Vec<String>,
    pub pool_size: usize,
    pub item_timeout: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub items: Vec<ItemId>,
    pub read_policy: ReadPolicy,
}

impl Config {
    /// Three local price services, a pool of four and products 1 through 6.
    pub fn builtin() -> Self {
        let endpoints = [8080, 8090, 9080]
            .iter()
            .map(|port| format!("http://localhost:{port}/products/price"))
            .collect();

        Self {
            endpoints,
            pool_size: DEFAULT_POOL_SIZE,
            item_timeout: DEFAULT_ITEM_TIMEOUT,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            request_timeout: None,
            items: (1..=6).map(ItemId::from).collect(),
            read_policy: ReadPolicy::BestEffort,
        }
    }

    pub fn client_timeouts(&self) -> ClientTimeouts {
        ClientTimeouts {
            connect: self.connect_timeout,
            request: self.request_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}
