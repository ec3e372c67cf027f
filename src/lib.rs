pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gather;
pub mod utils;

#[cfg(test)]
mod testutil;

pub use error::{AppError, Result};
