use std::{collections::HashSet, path::PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const WEEKS_PER_YEAR: usize = 53;
const MONTHS_PER_YEAR: usize = 12;

/// Month owning each weekly bucket, taken from the Thursday of that week.
/// The last bucket always belongs to December.
pub const DEFAULT_WEEK_MONTH_MAP: [usize; WEEKS_PER_YEAR] = [
    0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 6,
    7, 7, 7, 7, 8, 8, 8, 8, 9, 9, 9, 9, 9, 10, 10, 10, 10, 11, 11, 11, 11, 11,
];

static DEFAULT_UNITS: Lazy<Vec<UnitConfig>> = Lazy::new(|| {
    [
        ("Juntos house", 0.10),
        ("Juntos boutique", 0.21),
        ("Picadeli", 0.10),
        ("Juntos farm shop", 0.10),
        ("Tasting place", 0.10),
        ("Distribution b2b", 0.10),
        ("Juntos Products", 0.10),
        ("Activities", 0.21),
    ]
    .into_iter()
    .map(|(name, vat_rate)| UnitConfig::new(name, vat_rate))
    .collect()
});

/// Configuration handed to the engine at construction. Never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub business_units: Vec<UnitConfig>,
    #[serde(default = "EngineConfig::default_week_month_map")]
    pub week_month_map: Vec<usize>,
    #[serde(default = "EngineConfig::default_fiscal_years")]
    pub fiscal_years: Vec<i32>,
    #[serde(default)]
    pub supported_years: YearWindow,
    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional directory holding the JSON data files. Defaults to `<data dir>/salesboard`.
    pub data_root: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            business_units: DEFAULT_UNITS.clone(),
            week_month_map: Self::default_week_month_map(),
            fiscal_years: Self::default_fiscal_years(),
            supported_years: YearWindow::default(),
            pagination: PaginationConfig::default(),
            data_root: None,
        }
    }
}

impl EngineConfig {
    pub fn default_week_month_map() -> Vec<usize> {
        DEFAULT_WEEK_MONTH_MAP.to_vec()
    }

    pub fn default_fiscal_years() -> Vec<i32> {
        vec![2024, 2025, 2026]
    }

    pub fn unit(&self, name: &str) -> Option<&UnitConfig> {
        self.business_units.iter().find(|unit| unit.name == name)
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("salesboard")
    }

    /// Checks structural invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.business_units.is_empty() {
            return Err(ConfigError::Invalid("no business units configured".into()));
        }

        let mut seen = HashSet::new();
        for unit in &self.business_units {
            if unit.name.trim().is_empty() {
                return Err(ConfigError::Invalid("business unit with empty name".into()));
            }
            if !unit.vat_rate.is_finite() || unit.vat_rate < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "VAT rate for `{}` must be a non-negative number",
                    unit.name
                )));
            }
            for key in std::iter::once(&unit.name).chain(unit.aliases.iter()) {
                if !seen.insert(key.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "unit name or alias `{key}` is declared more than once"
                    )));
                }
            }
        }

        if self.week_month_map.len() != WEEKS_PER_YEAR {
            return Err(ConfigError::Invalid(format!(
                "week-to-month table must have {WEEKS_PER_YEAR} entries, found {}",
                self.week_month_map.len()
            )));
        }
        if let Some(bad) = self
            .week_month_map
            .iter()
            .find(|month| **month >= MONTHS_PER_YEAR)
        {
            return Err(ConfigError::Invalid(format!(
                "week-to-month table contains month index {bad}"
            )));
        }

        if self.supported_years.first > self.supported_years.last {
            return Err(ConfigError::Invalid("supported year window is inverted".into()));
        }
        if let Some(year) = self
            .fiscal_years
            .iter()
            .find(|year| !self.supported_years.contains(**year))
        {
            return Err(ConfigError::Invalid(format!(
                "fiscal year {year} lies outside the supported year window"
            )));
        }

        if self.pagination.page_size == 0 {
            return Err(ConfigError::Invalid("page size must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One known business unit with its VAT rate and accepted raw-name aliases.
pub struct UnitConfig {
    pub name: String,
    pub vat_rate: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl UnitConfig {
    pub fn new(name: impl Into<String>, vat_rate: f64) -> Self {
        Self {
            name: name.into(),
            vat_rate,
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Inclusive window of calendar years the calendar model accepts.
pub struct YearWindow {
    pub first: i32,
    pub last: i32,
}

impl YearWindow {
    pub fn contains(&self, year: i32) -> bool {
        year >= self.first && year <= self.last
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self {
            first: 2000,
            last: 2100,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationConfig {
    #[serde(default = "PaginationConfig::default_page_size")]
    pub page_size: usize,
    #[serde(default = "PaginationConfig::default_max_retries")]
    pub max_retries: u32,
}

impl PaginationConfig {
    pub fn default_page_size() -> usize {
        1000
    }

    pub fn default_max_retries() -> u32 {
        3
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
            max_retries: Self::default_max_retries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().expect("default validates");
    }

    #[test]
    fn rejects_short_week_table() {
        let mut config = EngineConfig::default();
        config.week_month_map.pop();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_alias_colliding_with_unit_name() {
        let mut config = EngineConfig::default();
        config.business_units[0] = config.business_units[0].clone().with_alias("Picadeli");
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_vat() {
        let mut config = EngineConfig::default();
        config.business_units[1].vat_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn last_week_belongs_to_december() {
        assert_eq!(DEFAULT_WEEK_MONTH_MAP[52], 11);
        assert_eq!(DEFAULT_WEEK_MONTH_MAP[0], 0);
    }
}
