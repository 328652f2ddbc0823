//! Wiring of configuration, storage and the reporting services.

use salesboard_config::{ConfigManager, EngineConfig};
use salesboard_core::{
    Aggregation, AggregationEngine, BudgetPlan, CancellationFlag, Clock, DetailQuery,
    ExportTable, PagedReader, ReportService, SalesStore, SystemClock,
};
use salesboard_domain::{DetailView, Granularity, UnitSelection, VatMode, YearSummary};
use salesboard_storage_json::{JsonSalesStore, StoragePaths};
use tracing::info;

use crate::errors::AppError;

/// Owns the engine and its collaborators for the lifetime of a session.
pub struct Dashboard {
    config: EngineConfig,
    engine: AggregationEngine,
    store: Box<dyn SalesStore>,
    clock: Box<dyn Clock>,
    reader: PagedReader,
}

impl Dashboard {
    pub fn new(config: EngineConfig, store: Box<dyn SalesStore>) -> Result<Self, AppError> {
        let engine = AggregationEngine::new(&config)?;
        let reader = PagedReader::from_config(&config.pagination);
        Ok(Self {
            config,
            engine,
            store,
            clock: Box::new(SystemClock),
            reader,
        })
    }

    /// Loads configuration from the user's config directory and opens the JSON store
    /// under the configured data root.
    pub fn open_default() -> Result<Self, AppError> {
        let config = ConfigManager::default_location()?.load()?;
        let root = config.resolve_data_root();
        info!(root = %root.display(), "opening json store");
        let store = JsonSalesStore::open(StoragePaths::under(&root))?;
        let mut dashboard = Self::new(config, Box::new(store))?;
        dashboard.refresh_units()?;
        Ok(dashboard)
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> &AggregationEngine {
        &self.engine
    }

    pub fn fiscal_years(&self) -> &[i32] {
        &self.config.fiscal_years
    }

    /// Flag that aborts in-flight reads between pages; cloned handles share state.
    pub fn cancellation(&self) -> CancellationFlag {
        self.reader.cancellation().clone()
    }

    /// Attaches backend identifiers to configured units.
    pub fn refresh_units(&mut self) -> Result<(), AppError> {
        let rows = self.store.fetch_business_units()?;
        self.engine.units_mut().attach_ids(&rows);
        Ok(())
    }

    fn service(&self) -> ReportService<'_, dyn SalesStore> {
        ReportService::new(
            &self.engine,
            &*self.store,
            self.reader.clone(),
            &*self.clock,
        )
    }

    fn ensure_fiscal_year(&self, year: i32) -> Result<(), AppError> {
        if self.config.fiscal_years.contains(&year) {
            Ok(())
        } else {
            Err(AppError::InvalidArgument(format!(
                "{year} is not a configured fiscal year"
            )))
        }
    }

    pub fn aggregate(
        &self,
        year: i32,
        granularity: Granularity,
        vat: VatMode,
    ) -> Result<Aggregation, AppError> {
        Ok(self.service().aggregate_year(year, granularity, vat)?)
    }

    pub fn budget(&self, year: i32, vat: VatMode) -> Result<BudgetPlan, AppError> {
        Ok(self.service().budget_plan(year, vat)?)
    }

    pub fn detail_view(&self, query: &DetailQuery) -> Result<DetailView, AppError> {
        self.ensure_fiscal_year(query.year)?;
        Ok(self.service().detail_view(query)?)
    }

    pub fn year_summary(
        &self,
        year: i32,
        selection: &UnitSelection,
        vat: VatMode,
    ) -> Result<YearSummary, AppError> {
        self.ensure_fiscal_year(year)?;
        Ok(self.service().year_summary(year, selection, vat)?)
    }

    pub fn export(&self, query: &DetailQuery) -> Result<ExportTable, AppError> {
        Ok(ExportTable::from_view(&self.detail_view(query)?))
    }
}
