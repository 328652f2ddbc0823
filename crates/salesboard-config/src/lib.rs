//! salesboard-config
//!
//! Immutable engine configuration (unit table, VAT rates, week-to-month table, fiscal years)
//! plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{
    EngineConfig, PaginationConfig, UnitConfig, YearWindow, DEFAULT_WEEK_MONTH_MAP,
};
