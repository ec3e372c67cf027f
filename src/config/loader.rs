use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::{AppError, Context, Result};
use crate::fetch::ItemId;
use crate::gather::ReadPolicy;

use super::{validator, Config};

/// On-disk shape of a run configuration. Absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default)]
    pub endpoints: Option<Vec<String>>,
    #[serde(default)]
    pub pool_size: Option<usize>,
    #[serde(default)]
    pub item_timeout_ms: Option<u64>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub items: Option<Vec<String>>,
    #[serde(default)]
    pub items_file: Option<PathBuf>,
    #[serde(default)]
    pub read_policy: Option<ReadPolicy>,
}

impl RawConfig {
    /// Overlay these values on `base`. A relative `items_file` resolves against `base_dir`.
    pub fn apply(self, mut base: Config, base_dir: &Path) -> Result<Config> {
        if let Some(endpoints) = self.endpoints {
            base.endpoints = endpoints;
        }
        if let Some(pool_size) = self.pool_size {
            base.pool_size = pool_size;
        }
        if let Some(ms) = self.item_timeout_ms {
            base.item_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.connect_timeout_ms {
            base.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.request_timeout_ms {
            base.request_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(read_policy) = self.read_policy {
            base.read_policy = read_policy;
        }

        match (self.items, self.items_file) {
            (Some(_), Some(_)) => {
                return Err(AppError::message(
                    "config may set either `items` or `items_file`, not both",
                ))
            }
            (Some(items), None) => base.items = items.into_iter().map(ItemId::from).collect(),
            (None, Some(file)) => base.items = load_items(&base_dir.join(file))?,
            (None, None) => {}
        }

        Ok(base)
    }
}

/// Load a JSON run configuration on top of the built-in defaults and validate it.
pub fn load_config(path: &Path) -> Result<Config> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config JSON at {}", path.display()))?;

    let raw: RawConfig = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse config JSON at {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = raw.apply(Config::builtin(), base_dir)?;

    validator::validate(&config)?;
    Ok(config)
}

/// Read item identifiers from the first column of a header-less CSV file.
/// Blank lines and `#` comments are skipped.
pub fn load_items(path: &Path) -> Result<Vec<ItemId>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open item list at {}", path.display()))?;

    let mut items = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("failed to read item list at {}", path.display()))?;
        if let Some(id) = record.get(0).filter(|id| !id.is_empty()) {
            items.push(ItemId::from(id));
        }
    }

    Ok(items)
}
