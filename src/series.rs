//! Newest-first value series with explicit missing slots.

use serde::{Deserialize, Serialize};

/// An ordered numeric series addressed by bar offset.
///
/// Offset `0` is the most recent bar and offset `k` is `k` bars earlier.
/// Slots with insufficient history hold `None`. Indexing is total:
/// out-of-range and negative offsets resolve to `None` rather than panicking.
///
/// # Example
///
/// ```
/// use finance_rules::Series;
///
/// let closes = Series::new(vec![Some(110.0), Some(100.0)]);
/// assert_eq!(closes.value_at(0), Some(110.0));
/// assert_eq!(closes.value_at(1), Some(100.0));
/// assert_eq!(closes.value_at(2), None);
/// assert_eq!(closes.value_at(-1), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series(Vec<Option<f64>>);

impl Series {
    /// Create a series from newest-first slots.
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self(values)
    }

    /// Create a fully populated series from newest-first values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(values.into_iter().map(Some).collect())
    }

    /// Create a series from oldest-first slots, reversing into newest-first order.
    pub fn from_ascending(values: Vec<Option<f64>>) -> Self {
        let mut values = values;
        values.reverse();
        Self(values)
    }

    /// Value at the given offset, `None` when the offset is negative,
    /// beyond the end, or the slot itself is missing.
    pub fn value_at(&self, offset: i64) -> Option<f64> {
        if offset < 0 {
            return None;
        }
        self.0.get(offset as usize).copied().flatten()
    }

    /// Value at offset 0 (the most recent bar).
    pub fn latest(&self) -> Option<f64> {
        self.value_at(0)
    }

    /// Number of slots, including missing ones.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the series has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All slots, newest first.
    pub fn values(&self) -> &[Option<f64>] {
        &self.0
    }
}
