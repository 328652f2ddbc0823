//! salesboard-domain
//!
//! Pure domain models for sales reporting (records, units, buckets, periods, report series).
//! No I/O, no storage, no logging. Only data types and core enums.

pub mod buckets;
pub mod common;
pub mod period;
pub mod record;
pub mod report;
pub mod unit;

pub use buckets::*;
pub use common::*;
pub use period::*;
pub use record::*;
pub use report::*;
pub use unit::*;
