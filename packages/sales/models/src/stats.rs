//! Running aggregates for one load session.

use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeMap as _;
use serde::{Serialize, Serializer};

use crate::{LocationKey, SalesRecord};

/// Per-key quantity totals that remember first-insertion order.
///
/// Iteration yields keys in the order they were first added, which is the
/// tie-break order for rankings built on top of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedTotals {
    entries: Vec<(String, u64)>,
    index: BTreeMap<String, usize>,
}

impl OrderedTotals {
    /// Creates an empty set of totals.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Adds `quantity` to the total for `key`, inserting it at the end if
    /// it has not been seen yet. Totals saturate at `u64::MAX`.
    pub fn add(&mut self, key: &str, quantity: u64) {
        if let Some(&pos) = self.index.get(key) {
            let total = &mut self.entries[pos].1;
            *total = total.saturating_add(quantity);
        } else {
            self.index.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), quantity));
        }
    }

    /// Returns the total for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u64> {
        self.index.get(key).map(|&pos| self.entries[pos].1)
    }

    /// Iterates `(key, total)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(key, total)| (key.as_str(), *total))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for OrderedTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, total) in &self.entries {
            map.serialize_entry(key, total)?;
        }
        map.end()
    }
}

/// Aggregate statistics over every valid record of one load.
///
/// Every valid record is folded in exactly once, whether or not its
/// postal code could be geocoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    /// Sum of quantities.
    pub total_quantity: u64,
    /// Distinct postal codes seen.
    pub postal_codes: BTreeSet<String>,
    /// Distinct states seen.
    pub states: BTreeSet<String>,
    /// Quantity per device category label.
    pub device_totals: OrderedTotals,
    /// Quantity per location key.
    pub location_totals: OrderedTotals,
}

impl AggregateStats {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one valid record into the totals. Totals saturate at
    /// `u64::MAX`.
    pub fn fold(&mut self, record: &SalesRecord, quantity: u64, location_key: LocationKey) {
        self.total_quantity = self.total_quantity.saturating_add(quantity);
        self.postal_codes.insert(record.postal_code.clone());
        self.states.insert(record.state.clone());
        self.device_totals.add(record.device_category.as_str(), quantity);
        self.location_totals
            .add(&record.location_key(location_key), quantity);
    }

    /// Number of distinct postal codes.
    #[must_use]
    pub fn unique_postal_code_count(&self) -> usize {
        self.postal_codes.len()
    }

    /// Number of distinct states.
    #[must_use]
    pub fn unique_state_count(&self) -> usize {
        self.states.len()
    }
}
