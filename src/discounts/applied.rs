//! Applied Discounts
//!
//! The ordered, append-only log of which discounts changed which cart lines.

use rusty_money::{Money, MoneyError, iso::Currency};
use tracing::debug;

use crate::{
    discounts::{Discount, DiscountKey},
    lines::{CartLine, LineKey},
};

/// Record of one discount applied to one cart line
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount<'a> {
    /// Key of the line the discount changed
    pub line: LineKey,

    /// Key of the discount that was applied
    pub discount: DiscountKey,

    /// Discount name at the time it was applied
    pub discount_name: String,

    /// Line total before the discount ran
    pub original_total: Money<'a, Currency>,

    /// Line total after the discount ran
    pub final_total: Money<'a, Currency>,
}

impl<'a> AppliedDiscount<'a> {
    /// Amount this application took off the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the original and final totals cannot be subtracted.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.original_total.sub(self.final_total)
    }
}

/// Ordered log of applied discounts.
///
/// Records are appended and never removed by evaluation; the same pair may appear more than once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedDiscounts<'a> {
    records: Vec<AppliedDiscount<'a>>,
}

impl<'a> AppliedDiscounts<'a> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record pairing `line` with `discount`, and annotate the line.
    pub fn record(
        &mut self,
        line: &mut CartLine<'a>,
        discount: &Discount,
        original_total: Money<'a, Currency>,
    ) {
        debug!(
            line = ?line.key(),
            discount = ?discount.key(),
            name = discount.name(),
            total = %line.total(),
            "applied discount"
        );

        line.annotate(discount.key());

        self.records.push(AppliedDiscount {
            line: line.key(),
            discount: discount.key(),
            discount_name: discount.name().to_string(),
            original_total,
            final_total: *line.total(),
        });
    }

    /// Iterate over records in application order.
    pub fn iter(&self) -> impl Iterator<Item = &AppliedDiscount<'a>> {
        self.records.iter()
    }

    /// Records for a single line.
    pub fn for_line(&self, line: LineKey) -> impl Iterator<Item = &AppliedDiscount<'a>> {
        self.records.iter().filter(move |record| record.line == line)
    }

    /// Records for a single discount.
    pub fn for_discount(
        &self,
        discount: DiscountKey,
    ) -> impl Iterator<Item = &AppliedDiscount<'a>> {
        self.records
            .iter()
            .filter(move |record| record.discount == discount)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop records written after `len`, undoing a strategy that failed part-way.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }
}

impl<'s, 'a> IntoIterator for &'s AppliedDiscounts<'a> {
    type Item = &'s AppliedDiscount<'a>;
    type IntoIter = std::slice::Iter<'s, AppliedDiscount<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
