#![doc(test(attr(deny(warnings))))]

//! Salesboard turns raw per-day sales rows into time-bucketed, VAT-aware aggregates
//! and the comparison views built on top of them.

pub mod cli;
pub mod dashboard;
pub mod errors;
pub mod utils;

pub use salesboard_config;
pub use salesboard_core;
pub use salesboard_domain;
pub use salesboard_storage_json;

pub use dashboard::Dashboard;
pub use errors::AppError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        let build = utils::build_info::current();
        tracing::info!(
            version = build.version,
            git = build.git_hash,
            "Salesboard tracing initialized."
        );
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
