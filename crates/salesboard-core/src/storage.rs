use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use salesboard_config::PaginationConfig;
use salesboard_domain::{BudgetRow, DateRange, SalesRow, UnitRow};
use tracing::{debug, error, info, warn};

use crate::calendar::CalendarModel;
use crate::error::CoreError;

/// Read access to the hosted sales backend.
pub trait SalesStore: Send + Sync {
    /// Rows dated within `range`, ordered by date, starting at `offset`, at most `limit` rows.
    fn fetch_sales_page(
        &self,
        range: DateRange,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SalesRow>, CoreError>;
    fn fetch_business_units(&self) -> Result<Vec<UnitRow>, CoreError>;
    fn fetch_budget_targets(&self, range: DateRange) -> Result<Vec<BudgetRow>, CoreError>;
}

/// Shared flag that stops a paginated read between pages.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reads every row of a range in fixed-size pages.
#[derive(Debug, Clone)]
pub struct PagedReader {
    page_size: usize,
    max_retries: u32,
    cancel: CancellationFlag,
}

impl PagedReader {
    pub fn new(page_size: usize, max_retries: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            max_retries,
            cancel: CancellationFlag::default(),
        }
    }

    pub fn from_config(config: &PaginationConfig) -> Self {
        Self::new(config.page_size, config.max_retries)
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetches pages until one comes back short. Either every row is returned or an error is.
    pub fn read_all<S: SalesStore + ?Sized>(
        &self,
        store: &S,
        range: DateRange,
    ) -> Result<Vec<SalesRow>, CoreError> {
        let mut rows = Vec::new();
        let mut offset = 0;
        loop {
            if self.cancel.is_cancelled() {
                warn!(offset, fetched = rows.len(), "sales read cancelled");
                return Err(CoreError::Cancelled);
            }
            let page = self.fetch_with_retry(store, range, offset, rows.len())?;
            let count = page.len();
            debug!(offset, count, "fetched sales page");
            rows.extend(page);
            if count < self.page_size {
                break;
            }
            offset += count;
        }
        info!(
            start = %range.start,
            end = %range.end,
            rows = rows.len(),
            "sales range loaded"
        );
        Ok(rows)
    }

    fn fetch_with_retry<S: SalesStore + ?Sized>(
        &self,
        store: &S,
        range: DateRange,
        offset: usize,
        fetched: usize,
    ) -> Result<Vec<SalesRow>, CoreError> {
        let mut attempt = 0;
        loop {
            match store.fetch_sales_page(range, offset, self.page_size) {
                Ok(page) => return Ok(page),
                Err(err) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(offset, attempt, %err, "sales page failed, retrying");
                }
                Err(err) => {
                    error!(offset, fetched, %err, "sales read aborted");
                    return Err(CoreError::PaginationAborted {
                        offset,
                        fetched,
                        reason: err.to_string(),
                    });
                }
            }
        }
    }
}

/// In-memory store, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySalesStore {
    sales: Vec<SalesRow>,
    units: Vec<UnitRow>,
    budgets: Vec<BudgetRow>,
}

impl MemorySalesStore {
    pub fn new(sales: Vec<SalesRow>) -> Self {
        let mut store = Self {
            sales,
            ..Self::default()
        };
        store.sort_sales();
        store
    }

    pub fn with_units(mut self, units: Vec<UnitRow>) -> Self {
        self.units = units;
        self
    }

    pub fn with_budgets(mut self, budgets: Vec<BudgetRow>) -> Self {
        self.budgets = budgets;
        self
    }

    pub fn push_sales(&mut self, rows: impl IntoIterator<Item = SalesRow>) {
        self.sales.extend(rows);
        self.sort_sales();
    }

    pub fn sales_len(&self) -> usize {
        self.sales.len()
    }

    fn sort_sales(&mut self) {
        self.sales.sort_by_key(|row| {
            row.date
                .as_deref()
                .and_then(|raw| CalendarModel::parse_date(raw).ok())
        });
    }
}

/// Rows whose date cannot be parsed are kept so ingest can report them.
fn in_range(raw: Option<&str>, range: DateRange) -> bool {
    match raw.map(CalendarModel::parse_date) {
        Some(Ok(date)) => range.contains(date),
        _ => true,
    }
}

impl SalesStore for MemorySalesStore {
    fn fetch_sales_page(
        &self,
        range: DateRange,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SalesRow>, CoreError> {
        Ok(self
            .sales
            .iter()
            .filter(|row| in_range(row.date.as_deref(), range))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn fetch_business_units(&self) -> Result<Vec<UnitRow>, CoreError> {
        Ok(self.units.clone())
    }

    fn fetch_budget_targets(&self, range: DateRange) -> Result<Vec<BudgetRow>, CoreError> {
        Ok(self
            .budgets
            .iter()
            .filter(|row| in_range(Some(row.month_start.as_str()), range))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn rows(count: usize) -> Vec<SalesRow> {
        (0..count)
            .map(|i| SalesRow::new(&format!("2025-03-{:02}", i % 28 + 1), "Picadeli", 1.0, 1))
            .collect()
    }

    struct FlakyStore {
        inner: MemorySalesStore,
        failures: Mutex<Vec<usize>>,
    }

    impl SalesStore for FlakyStore {
        fn fetch_sales_page(
            &self,
            range: DateRange,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<SalesRow>, CoreError> {
            let mut failures = self.failures.lock().unwrap();
            if let Some(pos) = failures.iter().position(|o| *o == offset) {
                failures.remove(pos);
                return Err(CoreError::Storage("connection reset".into()));
            }
            self.inner.fetch_sales_page(range, offset, limit)
        }

        fn fetch_business_units(&self) -> Result<Vec<UnitRow>, CoreError> {
            self.inner.fetch_business_units()
        }

        fn fetch_budget_targets(&self, range: DateRange) -> Result<Vec<BudgetRow>, CoreError> {
            self.inner.fetch_budget_targets(range)
        }
    }

    #[test]
    fn reads_across_page_boundaries() {
        let store = MemorySalesStore::new(rows(25));
        let rows = PagedReader::new(10, 0).read_all(&store, range()).unwrap();
        assert_eq!(rows.len(), 25);
    }

    #[test]
    fn exact_multiple_of_page_size_terminates() {
        let store = MemorySalesStore::new(rows(20));
        let rows = PagedReader::new(10, 0).read_all(&store, range()).unwrap();
        assert_eq!(rows.len(), 20);
    }

    #[test]
    fn transient_failure_is_retried() {
        let store = FlakyStore {
            inner: MemorySalesStore::new(rows(15)),
            failures: Mutex::new(vec![10]),
        };
        let rows = PagedReader::new(10, 1).read_all(&store, range()).unwrap();
        assert_eq!(rows.len(), 15);
    }

    #[test]
    fn persistent_failure_aborts_without_partial_data() {
        let store = FlakyStore {
            inner: MemorySalesStore::new(rows(15)),
            failures: Mutex::new(vec![10, 10]),
        };
        let err = PagedReader::new(10, 1).read_all(&store, range()).unwrap_err();
        match err {
            CoreError::PaginationAborted { offset, fetched, .. } => {
                assert_eq!(offset, 10);
                assert_eq!(fetched, 10);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cancelled_reader_stops() {
        let store = MemorySalesStore::new(rows(5));
        let flag = CancellationFlag::new();
        flag.cancel();
        let reader = PagedReader::new(10, 0).with_cancellation(flag);
        assert!(matches!(
            reader.read_all(&store, range()),
            Err(CoreError::Cancelled)
        ));
    }

    #[test]
    fn memory_store_filters_by_range() {
        let mut store = MemorySalesStore::new(rows(3));
        store.push_sales(vec![SalesRow::new("2024-12-31", "Picadeli", 1.0, 1)]);
        let page = store.fetch_sales_page(range(), 0, 100).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(store.sales_len(), 4);
    }
}
