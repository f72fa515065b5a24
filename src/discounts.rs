//! Discounts
//!
//! A [`Discount`] is the stored configuration of one promotion: which strategy runs it (its type
//! tag), when it runs relative to other discounts (its priority), when it is live, and the
//! strategy-specific parameters it carries.

use jiff::Timestamp;
use slotmap::new_key_type;

use crate::discounts::{data::DiscountData, restrictions::Restrictions, window::ActiveWindow};

pub mod adjustments;
pub mod applied;
pub mod data;
pub mod restrictions;
pub mod window;

new_key_type! {
    /// Discount Key
    pub struct DiscountKey;
}

/// A configured discount.
#[derive(Debug, Clone, PartialEq)]
pub struct Discount {
    key: DiscountKey,
    name: String,
    kind: String,
    priority: i32,
    active: bool,
    window: ActiveWindow,
    data: DiscountData,
    restrictions: Restrictions,
}

impl Discount {
    /// Create an active, unbounded discount with no data or restrictions.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, priority: i32) -> Self {
        Self {
            key: DiscountKey::default(),
            name: name.into(),
            kind: kind.into(),
            priority,
            active: true,
            window: ActiveWindow::unbounded(),
            data: DiscountData::default(),
            restrictions: Restrictions::default(),
        }
    }

    /// Set the discount key.
    #[must_use]
    pub fn with_key(mut self, key: DiscountKey) -> Self {
        self.key = key;
        self
    }

    /// Set the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Set the time window.
    #[must_use]
    pub fn with_window(mut self, window: ActiveWindow) -> Self {
        self.window = window;
        self
    }

    /// Replace the data payload.
    #[must_use]
    pub fn with_data(mut self, data: DiscountData) -> Self {
        self.data = data;
        self
    }

    /// Add a single data parameter.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.data.insert(name, value);
        self
    }

    /// Set the restrictions.
    #[must_use]
    pub fn with_restrictions(mut self, restrictions: Restrictions) -> Self {
        self.restrictions = restrictions;
        self
    }

    /// Discount key
    pub fn key(&self) -> DiscountKey {
        self.key
    }

    /// Discount name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag selecting the strategy
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Priority; lower values are evaluated first
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Active flag
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Time window
    pub fn window(&self) -> &ActiveWindow {
        &self.window
    }

    /// Strategy-specific parameters
    pub fn data(&self) -> &DiscountData {
        &self.data
    }

    /// Brand and collection restrictions
    pub fn restrictions(&self) -> &Restrictions {
        &self.restrictions
    }

    /// Whether the discount is active and its window contains `at`.
    pub fn is_live(&self, at: Timestamp) -> bool {
        self.active && self.window.contains(at)
    }

    /// Evaluation order: ascending priority, ties broken by key.
    pub fn order_key(&self) -> (i32, DiscountKey) {
        (self.priority, self.key)
    }
}
