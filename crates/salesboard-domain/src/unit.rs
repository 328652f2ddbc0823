//! Business unit identities and selection helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label used for the derived series that spans every known unit.
pub const ALL_GROUPS_LABEL: &str = "All Groups";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A revenue-generating venue or channel with its VAT rate.
pub struct BusinessUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub vat_rate: f64,
}

impl BusinessUnit {
    pub fn new(name: impl Into<String>, vat_rate: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            vat_rate,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Removes VAT from a gross monetary amount.
    pub fn net_of_vat(&self, gross: f64) -> f64 {
        gross / (1.0 + self.vat_rate)
    }

    /// Adds VAT back onto a net monetary amount.
    pub fn gross_of_vat(&self, net: f64) -> f64 {
        net * (1.0 + self.vat_rate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Chooses whether a report covers a single unit or the across-unit aggregate.
pub enum UnitSelection {
    AllGroups,
    Unit(String),
}

impl UnitSelection {
    pub fn unit(name: impl Into<String>) -> Self {
        UnitSelection::Unit(name.into())
    }

    pub fn label(&self) -> &str {
        match self {
            UnitSelection::AllGroups => ALL_GROUPS_LABEL,
            UnitSelection::Unit(name) => name,
        }
    }

    pub fn is_all_groups(&self) -> bool {
        matches!(self, UnitSelection::AllGroups)
    }
}

impl fmt::Display for UnitSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
