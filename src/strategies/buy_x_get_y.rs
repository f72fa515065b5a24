//! Buy X Get Y
//!
//! For every full group of `buy + get` units on a line, `get` units are free.

use crate::{
    discounts::{Discount, data::DataError, restrictions::Restrictions},
    lines::{CartLine, line_amount},
    strategies::{DiscountStrategy, StrategyContext, StrategyError, StrategyFactory},
};

/// Buy-x-get-y discount type tag
pub const BUY_X_GET_Y: &str = "buy_x_get_y";

/// Builds [`BuyXGetYStrategy`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyXGetYFactory;

impl StrategyFactory for BuyXGetYFactory {
    fn tag(&self) -> &str {
        BUY_X_GET_Y
    }

    fn label(&self) -> &str {
        "Buy X get Y free"
    }

    fn build(&self, discount: &Discount) -> Result<Box<dyn DiscountStrategy>, DataError> {
        Ok(Box::new(BuyXGetYStrategy::from_discount(discount)?))
    }
}

/// Makes `get` of every `buy + get` units free.
#[derive(Debug, Clone)]
pub struct BuyXGetYStrategy {
    buy: u32,
    get: u32,
    restrictions: Restrictions,
}

impl BuyXGetYStrategy {
    /// Create a buy-x-get-y strategy.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidCount`] if `buy` or `get` is zero, or if the group size
    /// `buy + get` overflows.
    pub fn new(buy: u32, get: u32, restrictions: Restrictions) -> Result<Self, DataError> {
        if buy == 0 {
            return Err(DataError::InvalidCount {
                param: "buy".to_string(),
                value: buy.to_string(),
            });
        }

        if get == 0 || buy.checked_add(get).is_none() {
            return Err(DataError::InvalidCount {
                param: "get".to_string(),
                value: get.to_string(),
            });
        }

        Ok(Self {
            buy,
            get,
            restrictions,
        })
    }

    /// Read the strategy from its `buy` and `get` parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if either parameter is missing or not a positive integer.
    pub fn from_discount(discount: &Discount) -> Result<Self, DataError> {
        let data = discount.data();

        Self::new(
            data.count("buy")?,
            data.count("get")?,
            discount.restrictions().clone(),
        )
    }

    /// Number of free units for a line of `quantity` units.
    pub fn free_units(&self, quantity: u32) -> u32 {
        let group = self.buy.saturating_add(self.get);

        (quantity / group).saturating_mul(self.get)
    }
}

impl DiscountStrategy for BuyXGetYStrategy {
    fn execute<'a>(
        &self,
        mut line: CartLine<'a>,
        ctx: &mut StrategyContext<'_, 'a>,
    ) -> Result<CartLine<'a>, StrategyError> {
        let free = self.free_units(line.quantity());

        if free == 0 || !self.restrictions.permits(&line) {
            return Ok(line);
        }

        let free_amount = line_amount(line.unit_price(), free)?;
        let total = line.total().sub(free_amount)?;

        line.set_total(total);
        ctx.record_applied(&mut line);

        Ok(line)
    }
}
