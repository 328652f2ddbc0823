use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use salesboard_core::{CalendarModel, CoreError, SalesStore};
use salesboard_domain::{BudgetRow, DateRange, SalesRow, UnitRow};
use serde_json::Value;
use tracing::{debug, info};

const SALES_FILE: &str = "sales_daily.json";
const UNITS_FILE: &str = "business_units.json";
const BUDGETS_FILE: &str = "budget_targets.json";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Directory layout of a JSON data root.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub data_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    pub fn under(base: &Path) -> Self {
        Self {
            data_root: base.join("data"),
            backup_root: base.join("backups"),
        }
    }
}

/// File-backed sales store. Documents are read once at open and kept sorted by date.
#[derive(Debug, Clone)]
pub struct JsonSalesStore {
    paths: StoragePaths,
    retention: usize,
    sales: Vec<SalesRow>,
    units: Vec<UnitRow>,
    budgets: Vec<BudgetRow>,
}

impl JsonSalesStore {
    pub fn open(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.data_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        let mut store = Self {
            paths,
            retention: retention.max(1),
            sales: Vec::new(),
            units: Vec::new(),
            budgets: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-reads every document from disk. Missing documents are empty.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        self.sales = read_rows(&self.document_path(SALES_FILE))?;
        sort_by_date(&mut self.sales);
        self.units = read_rows(&self.document_path(UNITS_FILE))?;
        self.budgets = read_rows(&self.document_path(BUDGETS_FILE))?;
        info!(
            root = %self.paths.data_root.display(),
            sales = self.sales.len(),
            units = self.units.len(),
            budgets = self.budgets.len(),
            "json store loaded"
        );
        Ok(())
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn document_path(&self, file: &str) -> PathBuf {
        self.paths.data_root.join(file)
    }

    pub fn sales_len(&self) -> usize {
        self.sales.len()
    }

    pub fn save_sales(&mut self, rows: Vec<SalesRow>) -> Result<(), CoreError> {
        self.write_document(SALES_FILE, &rows)?;
        self.sales = rows;
        sort_by_date(&mut self.sales);
        Ok(())
    }

    /// Appends rows to the sales document.
    pub fn append_sales(&mut self, rows: impl IntoIterator<Item = SalesRow>) -> Result<(), CoreError> {
        let mut all = self.sales.clone();
        all.extend(rows);
        self.save_sales(all)
    }

    /// Replaces revenue and volume of every row matching `date` and `business_unit`.
    /// Returns the number of rows changed.
    pub fn correct_sales(
        &mut self,
        date: &str,
        business_unit: &str,
        revenue: f64,
        volume: u64,
    ) -> Result<usize, CoreError> {
        let target = CalendarModel::parse_date(date)?;
        let mut rows = self.sales.clone();
        let mut changed = 0;
        for row in rows.iter_mut() {
            let same_day = row
                .date
                .as_deref()
                .and_then(|raw| CalendarModel::parse_date(raw).ok())
                == Some(target);
            if same_day && row.business_unit.as_deref() == Some(business_unit) {
                row.revenue = Some(revenue.into());
                row.volume = Some((volume as f64).into());
                changed += 1;
            }
        }
        if changed > 0 {
            self.save_sales(rows)?;
        }
        debug!(date, business_unit, changed, "sales rows corrected");
        Ok(changed)
    }

    pub fn save_units(&mut self, rows: Vec<UnitRow>) -> Result<(), CoreError> {
        self.write_document(UNITS_FILE, &rows)?;
        self.units = rows;
        Ok(())
    }

    pub fn save_budgets(&mut self, rows: Vec<BudgetRow>) -> Result<(), CoreError> {
        self.write_document(BUDGETS_FILE, &rows)?;
        self.budgets = rows;
        Ok(())
    }

    /// Backups of a document, newest first.
    pub fn list_backups(&self, file: &str) -> Result<Vec<PathBuf>, CoreError> {
        let stem = document_stem(file);
        let mut entries = Vec::new();
        if !self.paths.backup_root.exists() {
            return Ok(entries);
        }
        for entry in fs::read_dir(&self.paths.backup_root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let matches = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&format!("{stem}_")))
                .unwrap_or(false);
            if matches {
                entries.push(path);
            }
        }
        entries.sort_by_key(|path| Reverse(backup_timestamp(path)));
        Ok(entries)
    }

    fn write_document<T: serde::Serialize>(&self, file: &str, rows: &[T]) -> Result<(), CoreError> {
        let path = self.document_path(file);
        self.backup_existing(file, &path)?;
        let json = serde_json::to_string_pretty(rows)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn backup_existing(&self, file: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let name = format!("{}_{}.{}", document_stem(file), timestamp, BACKUP_EXTENSION);
        fs::copy(path, self.paths.backup_root.join(name))?;
        for stale in self.list_backups(file)?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(stale);
        }
        Ok(())
    }
}

impl SalesStore for JsonSalesStore {
    fn fetch_sales_page(
        &self,
        range: DateRange,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SalesRow>, CoreError> {
        Ok(self
            .sales
            .iter()
            .filter(|row| within(row.date.as_deref(), range))
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
            .filter(|row| within(Some(row.month_start.as_str()), range))
            .cloned()
            .collect())
    }
}

/// Unparseable dates pass through so ingest can count them.
fn within(raw: Option<&str>, range: DateRange) -> bool {
    match raw.map(CalendarModel::parse_date) {
        Some(Ok(date)) => range.contains(date),
        _ => true,
    }
}

fn sort_by_date(rows: &mut [SalesRow]) {
    rows.sort_by_key(|row| {
        row.date
            .as_deref()
            .and_then(|raw| CalendarModel::parse_date(raw).ok())
    });
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, CoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(&data)?;
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Err(CoreError::Storage(format!(
            "{} must contain a JSON array",
            path.display()
        ))),
    }
}

fn document_stem(file: &str) -> &str {
    file.strip_suffix(".json").unwrap_or(file)
}

fn backup_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    let stem = path.file_stem()?.to_str()?;
    let raw = stem.get(stem.len().checked_sub(15)?..)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
