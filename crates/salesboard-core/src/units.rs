use std::collections::HashMap;

use salesboard_config::EngineConfig;
use salesboard_domain::{BusinessUnit, UnitRow, VatMode};
use tracing::debug;

use crate::error::CoreError;

/// Configured business units, addressable by canonical name or alias.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: Vec<BusinessUnit>,
    lookup: HashMap<String, usize>,
}

impl UnitRegistry {
    pub fn new(config: &EngineConfig) -> Self {
        let mut units = Vec::with_capacity(config.business_units.len());
        let mut lookup = HashMap::new();
        for (position, unit) in config.business_units.iter().enumerate() {
            units.push(BusinessUnit::new(unit.name.clone(), unit.vat_rate));
            lookup.insert(unit.name.clone(), position);
            for alias in &unit.aliases {
                lookup.insert(alias.clone(), position);
            }
        }
        Self { units, lookup }
    }

    /// Attaches database identifiers from reference rows. Unknown names are ignored.
    pub fn attach_ids(&mut self, rows: &[UnitRow]) {
        for row in rows {
            match self.lookup.get(row.name.trim()) {
                Some(position) => self.units[*position].id = Some(row.id),
                None => debug!(unit = %row.name, "reference unit has no configuration"),
            }
        }
    }

    /// Canonical unit for a raw name, or `None` when it is not configured.
    pub fn resolve(&self, raw: &str) -> Option<&BusinessUnit> {
        self.lookup
            .get(raw)
            .or_else(|| self.lookup.get(raw.trim()))
            .map(|position| &self.units[*position])
    }

    pub fn require(&self, raw: &str) -> Result<&BusinessUnit, CoreError> {
        self.resolve(raw)
            .ok_or_else(|| CoreError::UnknownBusinessUnit(raw.to_string()))
    }

    pub fn units(&self) -> &[BusinessUnit] {
        &self.units
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|unit| unit.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Converts a gross amount according to the VAT mode.
    pub fn apply_vat(unit: &BusinessUnit, amount: f64, vat: VatMode) -> f64 {
        match vat {
            VatMode::Gross => amount,
            VatMode::Net => unit.net_of_vat(amount),
        }
    }
}
