//! Discount Registry
//!
//! The set of known discount strategy factories, addressed by the type tag stored on each
//! discount.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::strategies::{BuyXGetYFactory, CouponFactory, ProductDiscountFactory, StrategyFactory};

/// Ordered registry of strategy factories.
///
/// Tags are indexed as factories are registered. When a tag is registered more than once the
/// first registration keeps resolving; later ones are still listed.
#[derive(Debug)]
pub struct DiscountRegistry {
    factories: Vec<Box<dyn StrategyFactory>>,
    by_tag: FxHashMap<String, usize>,
}

impl DiscountRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
            by_tag: FxHashMap::default(),
        }
    }

    /// Create a registry holding the built-in `coupon`, `product_discount` and `buy_x_get_y`
    /// strategies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry
            .register(CouponFactory)
            .register(ProductDiscountFactory)
            .register(BuyXGetYFactory);

        registry
    }

    /// Append a strategy factory.
    pub fn register<F>(&mut self, factory: F) -> &mut Self
    where
        F: StrategyFactory + 'static,
    {
        self.register_boxed(Box::new(factory))
    }

    /// Append an already boxed strategy factory.
    pub fn register_boxed(&mut self, factory: Box<dyn StrategyFactory>) -> &mut Self {
        let idx = self.factories.len();
        let tag = factory.tag().to_string();

        if self.by_tag.contains_key(&tag) {
            warn!(tag = %tag, "discount type registered more than once; keeping the first");
        } else {
            self.by_tag.insert(tag, idx);
        }

        self.factories.push(factory);

        self
    }

    /// All registered factories in registration order.
    pub fn list_types(&self) -> Vec<&dyn StrategyFactory> {
        self.factories.iter().map(AsRef::as_ref).collect()
    }

    /// Factory registered for `tag`, if any.
    pub fn resolve(&self, tag: &str) -> Option<&dyn StrategyFactory> {
        self.by_tag
            .get(tag)
            .and_then(|idx| self.factories.get(*idx))
            .map(AsRef::as_ref)
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no factories are registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for DiscountRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        discounts::{Discount, data::DataError},
        strategies::{DiscountStrategy, coupon::COUPON},
    };

    use super::*;

    #[derive(Debug)]
    struct NamedFactory {
        tag: &'static str,
        label: &'static str,
    }

    impl StrategyFactory for NamedFactory {
        fn tag(&self) -> &str {
            self.tag
        }

        fn label(&self) -> &str {
            self.label
        }

        fn build(&self, _discount: &Discount) -> Result<Box<dyn DiscountStrategy>, DataError> {
            Err(DataError::MissingParameter("never built".to_string()))
        }
    }

    #[test]
    fn builtins_are_listed_in_registration_order() {
        let registry = DiscountRegistry::with_builtins();

        let tags: Vec<&str> = registry.list_types().into_iter().map(|f| f.tag()).collect();

        assert_eq!(tags, ["coupon", "product_discount", "buy_x_get_y"]);
    }

    #[test]
    fn resolve_finds_registered_tag() {
        let registry = DiscountRegistry::with_builtins();

        assert_eq!(registry.resolve(COUPON).map(|f| f.label()), Some("Coupon code"));
        assert!(registry.resolve("loyalty").is_none());
    }

    #[test]
    fn first_registration_wins() {
        let mut registry = DiscountRegistry::new();

        registry
            .register(NamedFactory {
                tag: "loyalty",
                label: "First",
            })
            .register(NamedFactory {
                tag: "loyalty",
                label: "Second",
            });

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list_types().len(), 2);
        assert_eq!(registry.resolve("loyalty").map(|f| f.label()), Some("First"));
    }

    #[test]
    fn default_registry_has_builtins() {
        let registry = DiscountRegistry::default();

        let tags: Vec<&str> = registry.list_types().into_iter().map(|f| f.tag()).collect();

        assert_eq!(tags, ["coupon", "product_discount", "buy_x_get_y"]);
        assert!(registry.resolve(COUPON).is_some());
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = DiscountRegistry::new();

        assert!(registry.is_empty());
        assert!(registry.resolve(COUPON).is_none());
    }
}
