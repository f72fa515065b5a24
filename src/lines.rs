//! Cart Lines

use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{discounts::DiscountKey, products::Product, tags::TagSet};

new_key_type! {
    /// Cart Line Key
    pub struct LineKey;
}

/// Errors raised while building or mutating a cart line.
#[derive(Debug, Error, PartialEq)]
pub enum LineError {
    /// `unit price × quantity` does not fit in minor units.
    #[error("line amount overflowed: {unit_minor} x {quantity}")]
    AmountOverflow {
        /// Unit price in minor units
        unit_minor: i64,

        /// Requested quantity
        quantity: u32,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A single product/quantity/price entry within a cart.
///
/// `subtotal` is always `unit_price × quantity`. `total` starts at the subtotal and is lowered by
/// discount strategies; it never goes below zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    key: LineKey,
    name: String,
    brand: Option<String>,
    collections: TagSet,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    subtotal: Money<'a, Currency>,
    total: Money<'a, Currency>,
    coupon_codes: TagSet,
    applied: SmallVec<[DiscountKey; 4]>,
}

impl<'a> CartLine<'a> {
    /// Create a line for `quantity` units at `unit_price`.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::AmountOverflow`] if the subtotal cannot be represented.
    pub fn new(
        key: LineKey,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Result<Self, LineError> {
        let subtotal = line_amount(&unit_price, quantity)?;

        Ok(Self {
            key,
            name: name.into(),
            brand: None,
            collections: TagSet::empty(),
            quantity,
            unit_price,
            subtotal,
            total: subtotal,
            coupon_codes: TagSet::empty(),
            applied: SmallVec::new(),
        })
    }

    /// Create a line from a catalogue product.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::AmountOverflow`] if the subtotal cannot be represented.
    pub fn from_product(
        key: LineKey,
        product: &Product<'a>,
        quantity: u32,
    ) -> Result<Self, LineError> {
        let mut line = Self::new(key, product.name.clone(), product.price, quantity)?;

        line.brand.clone_from(&product.brand);
        line.collections = product.collections.clone();

        Ok(line)
    }

    /// Set the line brand.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the line collections.
    #[must_use]
    pub fn with_collections(mut self, collections: TagSet) -> Self {
        self.collections = collections;
        self
    }

    /// Mark a coupon code as redeemed against this line.
    #[must_use]
    pub fn with_coupon(mut self, code: &str) -> Self {
        self.redeem_coupon(code);
        self
    }

    /// Line key
    pub fn key(&self) -> LineKey {
        self.key
    }

    /// Product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Product brand
    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    /// Product collections
    pub fn collections(&self) -> &TagSet {
        &self.collections
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price of a single unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// `unit_price × quantity`, before any discount
    pub fn subtotal(&self) -> &Money<'a, Currency> {
        &self.subtotal
    }

    /// Current line total after the discounts applied so far
    pub fn total(&self) -> &Money<'a, Currency> {
        &self.total
    }

    /// Line currency
    pub fn currency(&self) -> &'a Currency {
        self.unit_price.currency()
    }

    /// Coupon codes redeemed against this line
    pub fn coupon_codes(&self) -> &TagSet {
        &self.coupon_codes
    }

    /// Whether `code` has been redeemed against this line.
    pub fn has_coupon(&self, code: &str) -> bool {
        self.coupon_codes.contains(code)
    }

    /// Keys of the discounts that changed this line, in application order.
    pub fn applied_discounts(&self) -> &[DiscountKey] {
        &self.applied
    }

    /// Redeem a coupon code against this line.
    pub fn redeem_coupon(&mut self, code: &str) {
        self.coupon_codes.insert(code);
    }

    /// Replace the line total, clamping negative amounts to zero.
    pub fn set_total(&mut self, total: Money<'a, Currency>) {
        self.total = clamp_to_zero(total);
    }

    /// Change the quantity.
    ///
    /// The subtotal is recalculated and the discount already taken off the line is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the new subtotal cannot be represented.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), LineError> {
        let discount = self.discount_amount()?;
        let subtotal = line_amount(&self.unit_price, quantity)?;

        self.quantity = quantity;
        self.subtotal = subtotal;
        self.total = clamp_to_zero(subtotal.sub(discount)?);

        Ok(())
    }

    /// Amount taken off the line so far (`subtotal - total`).
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn discount_amount(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Drop all discounts, restoring the total to the subtotal.
    pub fn reset(&mut self) {
        self.total = self.subtotal;
        self.applied.clear();
    }

    pub(crate) fn annotate(&mut self, discount: DiscountKey) {
        self.applied.push(discount);
    }
}

/// `price × quantity` in the price's currency.
///
/// # Errors
///
/// Returns [`LineError::AmountOverflow`] if the product does not fit in minor units.
pub fn line_amount<'a>(
    price: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, LineError> {
    let unit_minor = price.to_minor_units();

    unit_minor
        .checked_mul(i64::from(quantity))
        .map(|minor| Money::from_minor(minor, price.currency()))
        .ok_or(LineError::AmountOverflow {
            unit_minor,
            quantity,
        })
}

fn clamp_to_zero(money: Money<'_, Currency>) -> Money<'_, Currency> {
    if money.to_minor_units() < 0 {
        Money::from_minor(0, money.currency())
    } else {
        money
    }
}
