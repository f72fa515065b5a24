//! Cart

use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    evaluator::{DiscountEvaluator, EvaluatorError},
    lines::{CartLine, LineError, LineKey},
    products::Product,
    store::DiscountSource,
    tags::TagSet,
};

/// Errors related to cart construction, totals or repricing.
#[derive(Debug, Error)]
pub enum CartError {
    /// A product's currency differs from the cart currency (product, product currency, cart
    /// currency).
    #[error("Product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// Line arithmetic failed.
    #[error(transparent)]
    Line(#[from] LineError),

    /// Discount evaluation failed.
    #[error(transparent)]
    Evaluation(#[from] EvaluatorError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// No line with the given key.
    #[error("Line not found: {0:?}")]
    LineNotFound(LineKey),
}

/// A set of cart lines in a single currency, plus the coupon codes redeemed against it.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: SlotMap<LineKey, CartLine<'a>>,
    currency: &'static Currency,
    coupon_codes: TagSet,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: SlotMap::with_key(),
            currency,
            coupon_codes: TagSet::empty(),
        }
    }

    /// Add `quantity` units of `product` as a new line. Redeemed coupons carry over to it.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the product is priced in another currency or the line amount
    /// overflows.
    pub fn add_product(
        &mut self,
        product: &Product<'a>,
        quantity: u32,
    ) -> Result<LineKey, CartError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.name.clone(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let coupon_codes = &self.coupon_codes;

        let key = self.lines.try_insert_with_key(|key| {
            CartLine::from_product(key, product, quantity).map(|line| {
                coupon_codes
                    .iter()
                    .fold(line, |line, code| line.with_coupon(code))
            })
        })?;

        Ok(key)
    }

    /// Redeem a coupon code against every current and future line.
    pub fn redeem_coupon(&mut self, code: &str) {
        self.coupon_codes.insert(code);

        for line in self.lines.values_mut() {
            line.redeem_coupon(code);
        }
    }

    /// Change a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for an unknown key, or a [`CartError::Line`] if the new
    /// subtotal overflows.
    pub fn set_quantity(&mut self, key: LineKey, quantity: u32) -> Result<(), CartError> {
        let line = self
            .lines
            .get_mut(key)
            .ok_or(CartError::LineNotFound(key))?;

        line.set_quantity(quantity)?;

        Ok(())
    }

    /// Remove a line.
    pub fn remove_line(&mut self, key: LineKey) -> Option<CartLine<'a>> {
        self.lines.remove(key)
    }

    /// Look up a line by key.
    pub fn line(&self, key: LineKey) -> Option<&CartLine<'a>> {
        self.lines.get(key)
    }

    /// Iterate over the lines in the cart.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.values()
    }

    /// Coupon codes redeemed against the cart
    pub fn coupon_codes(&self) -> &TagSet {
        &self.coupon_codes
    }

    /// Sum of line subtotals.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the lines cannot be added.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.sum(CartLine::subtotal)
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the lines cannot be added.
    pub fn total(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.sum(CartLine::total)
    }

    /// Reprice every line through `evaluator`, starting each from its undiscounted subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Evaluation`] if the evaluator fails. Lines repriced before the
    /// failure keep their new totals.
    pub fn reprice<S: DiscountSource>(
        &mut self,
        evaluator: &mut DiscountEvaluator<'_, 'a, S>,
    ) -> Result<(), CartError> {
        for line in self.lines.values_mut() {
            let mut fresh = line.clone();
            fresh.reset();

            *line = evaluator.apply(&fresh)?;
        }

        debug!(lines = self.lines.len(), "repriced cart");

        Ok(())
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn sum(
        &self,
        amount: impl for<'l> Fn(&'l CartLine<'a>) -> &'l Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, MoneyError> {
        self.lines
            .values()
            .try_fold(Money::from_minor(0, self.currency), |acc, line| {
                acc.add(*amount(line))
            })
    }
}
