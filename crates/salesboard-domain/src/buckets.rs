//! Fixed-length bucket arrays and the tagged aggregate result.

use std::{
    collections::BTreeMap,
    fmt,
    ops::{Index, IndexMut},
};

use chrono::NaiveDate;
use serde::{
    de::{self, Deserializer},
    ser::{SerializeSeq, Serializer},
    Deserialize, Serialize,
};

use crate::common::{derive_spend, MONTHS_PER_YEAR, WEEKS_PER_YEAR};

/// Dense, zero-filled bucket array with a compile-time length.
#[derive(Clone, Copy, PartialEq)]
pub struct Buckets<const N: usize>([f64; N]);

pub type WeeklyBuckets = Buckets<WEEKS_PER_YEAR>;
pub type MonthlyBuckets = Buckets<MONTHS_PER_YEAR>;

impl<const N: usize> Buckets<N> {
    pub fn zeroed() -> Self {
        Self([0.0; N])
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Adds `amount` to the bucket at `index`, returning false when out of range.
    pub fn add(&mut self, index: usize, amount: f64) -> bool {
        match self.0.get_mut(index) {
            Some(slot) => {
                *slot += amount;
                true
            }
            None => false,
        }
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Pointwise sum of two bucket arrays.
    pub fn plus(&self, other: &Self) -> Self {
        let mut out = *self;
        for (slot, value) in out.0.iter_mut().zip(other.0.iter()) {
            *slot += value;
        }
        out
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = *self;
        for slot in out.0.iter_mut() {
            *slot = f(*slot);
        }
        out
    }

    /// Derives per-bucket spend from sales and transaction buckets.
    pub fn spend(sales: &Self, transactions: &Self) -> Self {
        let mut out = Self::zeroed();
        for (idx, slot) in out.0.iter_mut().enumerate() {
            *slot = derive_spend(sales.0[idx], transactions.0[idx]);
        }
        out
    }

    /// Returns the inclusive slice `start..=end`, or `None` when out of range.
    pub fn slice(&self, start: usize, end: usize) -> Option<&[f64]> {
        if start > end || end >= N {
            return None;
        }
        Some(&self.0[start..=end])
    }
}

impl<const N: usize> Default for Buckets<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<const N: usize> From<[f64; N]> for Buckets<N> {
    fn from(values: [f64; N]) -> Self {
        Self(values)
    }
}

impl<const N: usize> Index<usize> for Buckets<N> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<const N: usize> IndexMut<usize> for Buckets<N> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl<const N: usize> fmt::Debug for Buckets<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<const N: usize> Serialize for Buckets<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(N))?;
        for value in self.0.iter() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de, const N: usize> Deserialize<'de> for Buckets<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<f64>::deserialize(deserializer)?;
        let len = values.len();
        let array: [f64; N] = values
            .try_into()
            .map_err(|_| de::Error::invalid_length(len, &format!("{N} buckets").as_str()))?;
        Ok(Self(array))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "granularity", content = "values", rename_all = "lowercase")]
/// Aggregate output whose shape depends on granularity.
///
/// Daily results are sparse: a missing date means zero.
pub enum AggregateResult {
    Daily(BTreeMap<NaiveDate, f64>),
    Weekly(WeeklyBuckets),
    Monthly(MonthlyBuckets),
    Yearly(f64),
}

impl AggregateResult {
    pub fn total(&self) -> f64 {
        match self {
            AggregateResult::Daily(map) => map.values().sum(),
            AggregateResult::Weekly(buckets) => buckets.total(),
            AggregateResult::Monthly(buckets) => buckets.total(),
            AggregateResult::Yearly(value) => *value,
        }
    }

    /// Value for a single date of a daily result; absent dates are zero.
    pub fn daily_value(&self, date: NaiveDate) -> Option<f64> {
        match self {
            AggregateResult::Daily(map) => Some(map.get(&date).copied().unwrap_or(0.0)),
            _ => None,
        }
    }

    /// Dense values for fixed-length results.
    pub fn dense(&self) -> Option<Vec<f64>> {
        match self {
            AggregateResult::Daily(_) => None,
            AggregateResult::Weekly(buckets) => Some(buckets.to_vec()),
            AggregateResult::Monthly(buckets) => Some(buckets.to_vec()),
            AggregateResult::Yearly(value) => Some(vec![*value]),
        }
    }
}
