use std::fmt;

pub mod price;
pub mod request;

pub use price::HttpPriceFetcher;
pub use request::{build_client, price_url, ClientTimeouts};

/// Connect timeout applied to every backend request unless configured otherwise.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 20;

/// Opaque identifier for one unit of work, rendered verbatim as the last URL segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(String);

impl ItemId {
    pub fn new<T: Into<String>>(raw: T) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u32> for ItemId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

/// Why a single backend did not produce a price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Transport(String),
    Status(u16),
    EmptyBody,
    Malformed(String),
    Panicked,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Transport(reason) => write!(f, "transport error: {reason}"),
            FetchFailure::Status(code) => write!(f, "unexpected status {code}"),
            FetchFailure::EmptyBody => f.write_str("empty response body"),
            FetchFailure::Malformed(body) => write!(f, "malformed price `{body}`"),
            FetchFailure::Panicked => f.write_str("price source panicked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Price(u64),
    Failed(FetchFailure),
}

impl FetchOutcome {
    /// Value contributed to the aggregate; failures collapse to the zero sentinel.
    pub fn value(&self) -> u64 {
        match self {
            FetchOutcome::Price(price) => *price,
            FetchOutcome::Failed(_) => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

/// A backend capable of pricing an item. Implementations must not panic or
/// return errors; every problem is reported as `FetchOutcome::Failed`.
pub trait PriceSource: Send + Sync {
    fn fetch(&self, endpoint: &str, item: &ItemId) -> FetchOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_collapse_to_zero() {
        assert_eq!(FetchOutcome::Price(42).value(), 42);
        assert_eq!(FetchOutcome::Failed(FetchFailure::EmptyBody).value(), 0);
        assert!(FetchOutcome::Failed(FetchFailure::Status(500)).is_failure());
        assert!(!FetchOutcome::Price(0).is_failure());
    }

    #[test]
    fn item_ids_render_verbatim() {
        assert_eq!(ItemId::from(7).to_string(), "7");
        assert_eq!(ItemId::from("sku-12").as_str(), "sku-12");
        assert!(ItemId::from("a") < ItemId::from("b"));
    }
}
