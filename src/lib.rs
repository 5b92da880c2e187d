pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use crate::core::{
    aggregate::YearAggregator,
    pipeline::{TradePipeline, TradeReport},
};
pub use utils::error::{Result, TradeError};
