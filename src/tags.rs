//! Tags
//!
//! Sorted, de-duplicated string sets used for brands, collections and coupon codes.

use std::cmp::Ordering;

use serde::Deserialize;
use smallvec::SmallVec;

/// A sorted set of string tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct TagSet {
    tags: SmallVec<[String; 4]>,
}

impl TagSet {
    /// Create a tag set from any iterator of strings.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags: SmallVec<[String; 4]> = tags.into_iter().map(Into::into).collect();

        tags.sort();
        tags.dedup();

        Self { tags }
    }

    /// Create a tag set from string slices.
    pub fn from_strs(tags: &[&str]) -> Self {
        Self::new(tags.iter().copied())
    }

    /// Create an empty tag set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the set has no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Number of tags in the set.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the set contains `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
            .is_ok()
    }

    /// Whether the two sets share at least one tag.
    pub fn intersects(&self, other: &Self) -> bool {
        let mut left = self.tags.iter();
        let mut right = other.tags.iter();
        let mut left_tag = left.next();
        let mut right_tag = right.next();

        while let (Some(l), Some(r)) = (left_tag, right_tag) {
            match l.cmp(r) {
                Ordering::Equal => return true,
                Ordering::Less => left_tag = left.next(),
                Ordering::Greater => right_tag = right.next(),
            }
        }

        false
    }

    /// Add a tag, keeping the set sorted.
    pub fn insert(&mut self, tag: &str) {
        if let Err(pos) = self.tags.binary_search_by(|probe| probe.as_str().cmp(tag)) {
            self.tags.insert(pos, tag.to_string());
        }
    }

    /// Iterate over the tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        Self::new(tags)
    }
}
