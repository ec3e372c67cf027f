use anyhow::Result;
use clap::Parser;

use price_gather::app;
use price_gather::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    app::init_logger(cli.quiet);

    app::run(&cli)?;
    Ok(())
}
