pub mod bootstrap;
pub mod report;

pub use bootstrap::{init_logger, run};
pub use report::{render_json, render_summary};
