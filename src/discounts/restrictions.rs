//! Restrictions

use serde::Deserialize;

use crate::{lines::CartLine, tags::TagSet};

/// Brand and collection membership a line must satisfy for a discount to consider it.
///
/// An empty set places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Restrictions {
    /// Applicable brands
    #[serde(default)]
    pub brands: TagSet,

    /// Applicable collections
    #[serde(default)]
    pub collections: TagSet,
}

impl Restrictions {
    /// Create restrictions from brand and collection sets.
    pub fn new(brands: TagSet, collections: TagSet) -> Self {
        Self {
            brands,
            collections,
        }
    }

    /// Restrict to the given brands only.
    pub fn brands(brands: &[&str]) -> Self {
        Self::new(TagSet::from_strs(brands), TagSet::empty())
    }

    /// Restrict to the given collections only.
    pub fn collections(collections: &[&str]) -> Self {
        Self::new(TagSet::empty(), TagSet::from_strs(collections))
    }

    /// Whether the line satisfies both the brand and the collection restriction.
    pub fn permits(&self, line: &CartLine<'_>) -> bool {
        let brand_ok = self.brands.is_empty()
            || line.brand().is_some_and(|brand| self.brands.contains(brand));

        let collection_ok =
            self.collections.is_empty() || self.collections.intersects(line.collections());

        brand_ok && collection_ok
    }
}
