//! Discount Strategies
//!
//! A [`StrategyFactory`] is registered once per discount type tag and turns a stored
//! [`Discount`] into a [`DiscountStrategy`] that captures the discount's parameters and
//! restrictions. Strategies decide for themselves whether they apply to a line.

use std::fmt;

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::{
        Discount,
        adjustments::AdjustmentError,
        applied::AppliedDiscounts,
        data::DataError,
    },
    lines::{CartLine, LineError},
};

pub mod buy_x_get_y;
pub mod coupon;
pub mod product_discount;

pub use buy_x_get_y::{BuyXGetYFactory, BuyXGetYStrategy};
pub use coupon::{CouponFactory, CouponStrategy};
pub use product_discount::{ProductDiscountFactory, ProductDiscountStrategy};

/// Errors local to a single discount strategy.
#[derive(Debug, Error, PartialEq)]
pub enum StrategyError {
    /// Malformed or missing discount parameters.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Adjustment arithmetic failed.
    #[error(transparent)]
    Adjustment(#[from] AdjustmentError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Line arithmetic failed.
    #[error(transparent)]
    Line(#[from] LineError),
}

/// Per-discount state handed to a strategy while it runs.
#[derive(Debug)]
pub struct StrategyContext<'c, 'a> {
    discount: &'c Discount,
    applied: &'c mut AppliedDiscounts<'a>,
    original_total: Money<'a, Currency>,
}

impl<'c, 'a> StrategyContext<'c, 'a> {
    /// Create a context for running `discount` against a line whose total is `original_total`.
    pub fn new(
        discount: &'c Discount,
        applied: &'c mut AppliedDiscounts<'a>,
        original_total: Money<'a, Currency>,
    ) -> Self {
        Self {
            discount,
            applied,
            original_total,
        }
    }

    /// The discount being evaluated
    pub fn discount(&self) -> &Discount {
        self.discount
    }

    /// Line total before this strategy ran
    pub fn original_total(&self) -> &Money<'a, Currency> {
        &self.original_total
    }

    /// Record that this discount applied to `line`.
    pub fn record_applied(&mut self, line: &mut CartLine<'a>) {
        self.applied
            .record(line, self.discount, self.original_total);
    }
}

/// Type-specific discount logic.
pub trait DiscountStrategy: fmt::Debug {
    /// Apply the discount to `line` if its conditions are met.
    ///
    /// Returns the line unchanged when the conditions are not met. When it applies, the strategy
    /// adjusts the line and calls [`StrategyContext::record_applied`].
    ///
    /// # Errors
    ///
    /// Returns a [`StrategyError`] if the adjustment cannot be calculated.
    fn execute<'a>(
        &self,
        line: CartLine<'a>,
        ctx: &mut StrategyContext<'_, 'a>,
    ) -> Result<CartLine<'a>, StrategyError>;
}

/// Builds strategies for one discount type tag.
pub trait StrategyFactory: fmt::Debug + Send + Sync {
    /// Type tag stored on discounts
    fn tag(&self) -> &str;

    /// Human-readable name for configuration screens
    fn label(&self) -> &str;

    /// Build a strategy from the discount's data and restrictions.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if the discount data is malformed.
    fn build(&self, discount: &Discount) -> Result<Box<dyn DiscountStrategy>, DataError>;
}
