//! Persisted form of a rate snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use exchange_rates::{RateSnapshot, SnapshotError};

/// Cache entry written after every successful refresh.
///
/// Serialized as `{ "rates": { "USD": 1.0, ... }, "timestamp": <epoch millis> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRates {
    pub rates: BTreeMap<String, f64>,
    pub timestamp: i64,
}

impl CachedRates {
    /// Turns the entry back into a snapshot for `base`.
    pub fn into_snapshot(self, base: &str) -> Result<RateSnapshot, SnapshotError> {
        RateSnapshot::restore(base, self.rates, self.timestamp)
    }
}

impl From<&RateSnapshot> for CachedRates {
    fn from(snapshot: &RateSnapshot) -> Self {
        Self {
            rates: snapshot.rates().clone(),
            timestamp: snapshot.captured_at(),
        }
    }
}
