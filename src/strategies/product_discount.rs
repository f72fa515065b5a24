//! Product Discount
//!
//! A percentage discount, per-unit amount discount, or per-unit price override on every line that
//! passes the discount's brand and collection restrictions.

use crate::{
    discounts::{
        Discount,
        adjustments::{AdjustmentScope, LineAdjustment},
        data::DataError,
        restrictions::Restrictions,
    },
    lines::CartLine,
    strategies::{DiscountStrategy, StrategyContext, StrategyError, StrategyFactory},
};

/// Product discount type tag
pub const PRODUCT_DISCOUNT: &str = "product_discount";

/// Builds [`ProductDiscountStrategy`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductDiscountFactory;

impl StrategyFactory for ProductDiscountFactory {
    fn tag(&self) -> &str {
        PRODUCT_DISCOUNT
    }

    fn label(&self) -> &str {
        "Product discount"
    }

    fn build(&self, discount: &Discount) -> Result<Box<dyn DiscountStrategy>, DataError> {
        Ok(Box::new(ProductDiscountStrategy::from_discount(discount)?))
    }
}

/// Discounts qualifying lines of at least `min_quantity` units.
#[derive(Debug, Clone)]
pub struct ProductDiscountStrategy {
    adjustment: LineAdjustment,
    min_quantity: u32,
    restrictions: Restrictions,
}

impl ProductDiscountStrategy {
    /// Create a product discount strategy.
    pub fn new(adjustment: LineAdjustment, min_quantity: u32, restrictions: Restrictions) -> Self {
        Self {
            adjustment,
            min_quantity,
            restrictions,
        }
    }

    /// Read the discount from its data: one of `percentage`, `amount_off` or `amount_override`,
    /// and an optional `min_quantity` (default 1).
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if a parameter is missing or malformed.
    pub fn from_discount(discount: &Discount) -> Result<Self, DataError> {
        let data = discount.data();

        Ok(Self::new(
            LineAdjustment::from_data(data)?,
            data.optional_count("min_quantity")?.unwrap_or(1),
            discount.restrictions().clone(),
        ))
    }
}

impl DiscountStrategy for ProductDiscountStrategy {
    fn execute<'a>(
        &self,
        mut line: CartLine<'a>,
        ctx: &mut StrategyContext<'_, 'a>,
    ) -> Result<CartLine<'a>, StrategyError> {
        if line.quantity() < self.min_quantity || !self.restrictions.permits(&line) {
            return Ok(line);
        }

        let total = self.adjustment.adjusted_total(&line, AdjustmentScope::Unit)?;

        if total == *line.total() {
            return Ok(line);
        }

        line.set_total(total);
        ctx.record_applied(&mut line);

        Ok(line)
    }
}
