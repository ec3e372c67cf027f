use std::collections::HashSet;

use crate::error::{AppError, Result};

use super::Config;

/// Validate a merged run configuration and report every problem at once.
pub fn validate(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_endpoints(&config.endpoints, &mut issues);
    validate_limits(config, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "run config invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_endpoints(endpoints: &[String], issues: &mut Vec<String>) {
    if endpoints.is_empty() {
        issues.push("at least one endpoint must be configured".to_string());
        return;
    }

    let mut seen = HashSet::new();
    for endpoint in endpoints {
        let trimmed = endpoint.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            issues.push(format!("endpoint `{endpoint}` must be an http(s) URL"));
        }
        if !seen.insert(trimmed.trim_end_matches('/')) {
            log::warn!("endpoint `{endpoint}` is listed more than once");
        }
    }
}

fn validate_limits(config: &Config, issues: &mut Vec<String>) {
    if config.pool_size == 0 {
        issues.push("pool_size must be at least 1".to_string());
    }

    if config.item_timeout.is_zero() {
        issues.push("item timeout must be greater than zero".to_string());
    }

    if config.connect_timeout.is_zero() {
        issues.push("connect timeout must be greater than zero".to_string());
    }

    if matches!(config.request_timeout, Some(timeout) if timeout.is_zero()) {
        issues.push("request timeout must be greater than zero when set".to_string());
    }
}
