//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::tags::TagSet;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Product brand, if any
    pub brand: Option<String>,

    /// Collections (categories) the product belongs to
    pub collections: TagSet,

    /// Unit price
    pub price: Money<'a, Currency>,
}

impl<'a> Product<'a> {
    /// Create a product with no brand or collections.
    pub fn new(name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            brand: None,
            collections: TagSet::empty(),
            price,
        }
    }

    /// Set the product brand.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the product collections.
    #[must_use]
    pub fn with_collections(mut self, collections: TagSet) -> Self {
        self.collections = collections;
        self
    }
}
