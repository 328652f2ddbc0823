//! salesboard-core
//!
//! Time-bucketed sales aggregation: calendar/week model, aggregation engine, period
//! selection, comparison and budget reconciliation, KPI summaries, and export flattening.
//! Depends on salesboard-domain and salesboard-config. Storage is reached only through
//! the [`storage::SalesStore`] trait.

pub mod aggregation;
pub mod budget;
pub mod calendar;
pub mod comparison;
pub mod detail;
pub mod error;
pub mod export;
pub mod ingest;
pub mod report_service;
pub mod selector;
pub mod storage;
pub mod summary;
pub mod time;
pub mod units;

pub use aggregation::*;
pub use budget::*;
pub use calendar::CalendarModel;
pub use comparison::*;
pub use detail::*;
pub use error::CoreError;
pub use export::ExportTable;
pub use ingest::*;
pub use report_service::ReportService;
pub use selector::PeriodSelector;
pub use storage::{CancellationFlag, MemorySalesStore, PagedReader, SalesStore};
pub use summary::SummaryService;
pub use time::{Clock, FixedClock, SystemClock};
pub use units::UnitRegistry;
