use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{self, Config, RawConfig};
use crate::error::Result;
use crate::gather::ReadPolicy;

#[derive(Parser, Debug)]
#[command(name = "price-gather")]
#[command(about = "Ask several price backends for every item and sum what answers in time")]
#[command(version)]
pub struct Cli {
    /// JSON run configuration; CLI flags override its values
    #[arg(short, long, env = "PRICE_GATHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, repeat for several backends (replaces configured endpoints)
    #[arg(short = 'e', long = "endpoint")]
    pub endpoints: Vec<String>,

    /// Number of worker threads
    #[arg(short, long)]
    pub pool_size: Option<usize>,

    /// How long to wait for one item's backends, in milliseconds
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Total per-request timeout; unbounded when not set
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Comma separated item identifiers
    #[arg(short, long, value_delimiter = ',', conflicts_with = "items_file")]
    pub items: Vec<String>,

    /// CSV file with one item identifier per line
    #[arg(long)]
    pub items_file: Option<PathBuf>,

    /// Wait for every in-flight fetch before reading totals
    #[arg(long)]
    pub drain: bool,

    /// Print the report as a JSON object
    #[arg(long)]
    pub json: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Merge built-in defaults, the optional config file and CLI flags, then validate.
    pub fn resolve_config(&self) -> Result<Config> {
        let base = match &self.config {
            Some(path) => config::load_config(path)?,
            None => Config::builtin(),
        };

        let merged = self.overrides().apply(base, Path::new("."))?;
        config::validate(&merged)?;
        Ok(merged)
    }

    fn overrides(&self) -> RawConfig {
        RawConfig {
            endpoints: (!self.endpoints.is_empty()).then(|| self.endpoints.clone()),
            pool_size: self.pool_size,
            item_timeout_ms: self.timeout_ms,
            connect_timeout_ms: self.connect_timeout_ms,
            request_timeout_ms: self.request_timeout_ms,
            items: (!self.items.is_empty()).then(|| self.items.clone()),
            items_file: self.items_file.clone(),
            read_policy: self.drain.then_some(ReadPolicy::Drain),
        }
    }
}

/// Short human description of the effective settings, logged at startup.
pub fn describe(config: &Config) -> String {
    let request_timeout = config
        .request_timeout
        .map(|timeout| format!("{}ms", timeout.as_millis()))
        .unwrap_or_else(|| "none".to_string());

    format!(
        "{} items x {} endpoints, pool {}, wait {}ms, connect {}ms, request {}",
        config.items.len(),
        config.endpoints.len(),
        config.pool_size,
        config.item_timeout.as_millis(),
        config.connect_timeout.as_millis(),
        request_timeout
    )
}
