use std::sync::Arc;

use env_logger::Env;

use crate::cli::{self, Cli};
use crate::error::Result;
use crate::fetch::HttpPriceFetcher;
use crate::gather::{BatchDriver, BatchReport};
use crate::utils::current_human_timestamp;

use super::report;

/// Install the global logger. `RUST_LOG` wins over the default level.
pub fn init_logger(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}

/// Entry point used by `main`: resolve the config, run the batch and print the report.
pub fn run(cli: &Cli) -> Result<BatchReport> {
    let config = cli.resolve_config()?;
    log::info!(
        "Starting price gather at {}: {}",
        current_human_timestamp(),
        cli::describe(&config)
    );

    let fetcher = HttpPriceFetcher::new(config.client_timeouts())?;
    let driver = BatchDriver::new(
        config.endpoints.clone(),
        config.pool_size,
        config.item_timeout,
        Arc::new(fetcher),
    )?
    .with_read_policy(config.read_policy);

    let report = driver.run(&config.items)?;

    let rendered = if cli.json {
        report::render_json(&report)?
    } else {
        report::render_summary(&report)
    };
    println!("{rendered}");

    // Dropping the driver waits for fetches still running after a timeout.
    drop(driver);
    Ok(report)
}
