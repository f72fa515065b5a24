//! Discount Sources
//!
//! The read-only seam the evaluator loads discounts through, and an in-memory store.

use jiff::Timestamp;
use slotmap::SlotMap;
use thiserror::Error;

use crate::discounts::{Discount, DiscountKey};

/// Errors raised by a discount source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backing store could not be queried.
    #[error("discount source unavailable: {0}")]
    Unavailable(String),
}

/// A queryable store of discounts.
pub trait DiscountSource {
    /// Discounts that are active and whose window contains `at`, in ascending priority order.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the store cannot be queried.
    fn active_discounts(&self, at: Timestamp) -> Result<Vec<Discount>, SourceError>;
}

impl<T: DiscountSource + ?Sized> DiscountSource for &T {
    fn active_discounts(&self, at: Timestamp) -> Result<Vec<Discount>, SourceError> {
        (**self).active_discounts(at)
    }
}

/// In-memory discount store.
///
/// Keys are handed out in insertion order, so equal priorities resolve in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDiscountStore {
    discounts: SlotMap<DiscountKey, Discount>,
}

impl InMemoryDiscountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a discount, assigning it a key.
    pub fn insert(&mut self, discount: Discount) -> DiscountKey {
        self.discounts
            .insert_with_key(|key| discount.with_key(key))
    }

    /// Look up a discount by key.
    pub fn get(&self, key: DiscountKey) -> Option<&Discount> {
        self.discounts.get(key)
    }

    /// Remove a discount.
    pub fn remove(&mut self, key: DiscountKey) -> Option<Discount> {
        self.discounts.remove(key)
    }

    /// Iterate over all stored discounts, live or not.
    pub fn iter(&self) -> impl Iterator<Item = &Discount> {
        self.discounts.values()
    }

    /// Number of stored discounts
    pub fn len(&self) -> usize {
        self.discounts.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.discounts.is_empty()
    }
}

impl DiscountSource for InMemoryDiscountStore {
    fn active_discounts(&self, at: Timestamp) -> Result<Vec<Discount>, SourceError> {
        let mut discounts: Vec<Discount> = self
            .discounts
            .values()
            .filter(|discount| discount.is_live(at))
            .cloned()
            .collect();

        discounts.sort_by_key(Discount::order_key);

        Ok(discounts)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::discounts::window::ActiveWindow;

    use super::*;

    #[test]
    fn insert_assigns_keys() {
        let mut store = InMemoryDiscountStore::new();

        let key = store.insert(Discount::new("A", "coupon", 1));

        assert_eq!(store.get(key).map(Discount::key), Some(key));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn active_discounts_filters_and_orders() -> TestResult {
        let now: Timestamp = "2026-06-01T12:00:00Z".parse()?;
        let mut store = InMemoryDiscountStore::new();

        store.insert(Discount::new("Late", "coupon", 9));
        store.insert(Discount::new("Off", "coupon", 1).with_active(false));
        store.insert(
            Discount::new("Future", "coupon", 1)
                .with_window(ActiveWindow::starting("2026-07-01T00:00:00Z".parse()?)),
        );
        store.insert(
            Discount::new("Expired", "coupon", 1)
                .with_window(ActiveWindow::ending("2026-05-01T00:00:00Z".parse()?)),
        );
        store.insert(Discount::new("Early", "coupon", -3));
        store.insert(Discount::new("Tied", "coupon", 9));

        let names: Vec<String> = store
            .active_discounts(now)?
            .iter()
            .map(|d| d.name().to_string())
            .collect();

        assert_eq!(names, ["Early", "Late", "Tied"]);

        Ok(())
    }

    fn live_count(source: impl DiscountSource) -> Result<usize, SourceError> {
        Ok(source.active_discounts(Timestamp::UNIX_EPOCH)?.len())
    }

    #[test]
    fn references_are_sources() -> TestResult {
        let mut store = InMemoryDiscountStore::new();
        store.insert(Discount::new("A", "coupon", 1));

        let source: &dyn DiscountSource = &store;

        assert_eq!(live_count(&store)?, 1);
        assert_eq!(live_count(source)?, 1);

        Ok(())
    }

    #[test]
    fn remove_drops_discount() {
        let mut store = InMemoryDiscountStore::new();
        let key = store.insert(Discount::new("A", "coupon", 1));

        assert!(store.remove(key).is_some());
        assert!(store.is_empty());
    }
}
