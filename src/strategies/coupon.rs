//! Coupon
//!
//! A code-gated discount taken once off each line that carries the coupon code.

use rusty_money::{Money, iso::Currency};

use crate::{
    discounts::{
        Discount,
        adjustments::{AdjustmentScope, LineAdjustment, ensure_currency},
        data::DataError,
        restrictions::Restrictions,
    },
    lines::CartLine,
    strategies::{DiscountStrategy, StrategyContext, StrategyError, StrategyFactory},
};

/// Coupon discount type tag
pub const COUPON: &str = "coupon";

/// Builds [`CouponStrategy`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct CouponFactory;

impl StrategyFactory for CouponFactory {
    fn tag(&self) -> &str {
        COUPON
    }

    fn label(&self) -> &str {
        "Coupon code"
    }

    fn build(&self, discount: &Discount) -> Result<Box<dyn DiscountStrategy>, DataError> {
        Ok(Box::new(CouponStrategy::from_discount(discount)?))
    }
}

/// Applies when the line carries `code`, passes the restrictions and reaches `min_subtotal`.
#[derive(Debug, Clone)]
pub struct CouponStrategy {
    code: String,
    adjustment: LineAdjustment,
    min_subtotal: Option<Money<'static, Currency>>,
    restrictions: Restrictions,
}

impl CouponStrategy {
    /// Create a coupon strategy.
    pub fn new(
        code: impl Into<String>,
        adjustment: LineAdjustment,
        min_subtotal: Option<Money<'static, Currency>>,
        restrictions: Restrictions,
    ) -> Self {
        Self {
            code: code.into(),
            adjustment,
            min_subtotal,
            restrictions,
        }
    }

    /// Read the coupon from discount data.
    ///
    /// Expects `code`, one of `percentage` or `amount_off`, and an optional `min_subtotal`.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if a parameter is missing or malformed.
    pub fn from_discount(discount: &Discount) -> Result<Self, DataError> {
        let data = discount.data();

        Ok(Self::new(
            data.require("code")?,
            LineAdjustment::from_data_with(data, LineAdjustment::REDUCTION_PARAMS)?,
            data.optional_money("min_subtotal")?,
            discount.restrictions().clone(),
        ))
    }

    fn meets_threshold(&self, line: &CartLine<'_>) -> Result<bool, StrategyError> {
        let Some(min_subtotal) = &self.min_subtotal else {
            return Ok(true);
        };

        ensure_currency(line.subtotal(), min_subtotal)?;

        Ok(line.subtotal().to_minor_units() >= min_subtotal.to_minor_units())
    }
}

impl DiscountStrategy for CouponStrategy {
    fn execute<'a>(
        &self,
        mut line: CartLine<'a>,
        ctx: &mut StrategyContext<'_, 'a>,
    ) -> Result<CartLine<'a>, StrategyError> {
        if !line.has_coupon(&self.code) || !self.restrictions.permits(&line) {
            return Ok(line);
        }

        if !self.meets_threshold(&line)? {
            return Ok(line);
        }

        let total = self.adjustment.adjusted_total(&line, AdjustmentScope::Line)?;

        if total == *line.total() {
            return Ok(line);
        }

        line.set_total(total);
        ctx.record_applied(&mut line);

        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        MoneyError,
        iso::{GBP, USD},
    };
    use testresult::TestResult;

    use crate::strategies::test_support::{gbp_line, run};

    use super::*;

    fn coupon(params: &[(&str, &str)]) -> Discount {
        params
            .iter()
            .fold(Discount::new("Spring coupon", COUPON, 1), |d, (k, v)| {
                d.with_param(k, v)
            })
    }

    #[test]
    fn applies_when_code_is_redeemed() -> TestResult {
        let discount = coupon(&[("code", "SPRING"), ("percentage", "10%")]);
        let line = gbp_line(1000, 1)?.with_coupon("SPRING");

        let (line, applied) = run(&CouponFactory, &discount, line)?;

        assert_eq!(line.total(), &Money::from_minor(900, GBP));
        assert_eq!(applied.len(), 1);
        assert_eq!(line.applied_discounts(), &[discount.key()]);

        Ok(())
    }

    #[test]
    fn ignores_lines_without_code() -> TestResult {
        let discount = coupon(&[("code", "SPRING"), ("percentage", "10%")]);
        let line = gbp_line(1000, 1)?.with_coupon("SUMMER");

        let (line, applied) = run(&CouponFactory, &discount, line)?;

        assert_eq!(line.total(), &Money::from_minor(1000, GBP));
        assert!(applied.is_empty());

        Ok(())
    }

    #[test]
    fn amount_off_is_taken_once_per_line() -> TestResult {
        let discount = coupon(&[("code", "FIVER"), ("amount_off", "5.00 GBP")]);
        let line = gbp_line(1000, 3)?.with_coupon("FIVER");

        let (line, _) = run(&CouponFactory, &discount, line)?;

        assert_eq!(line.total(), &Money::from_minor(2500, GBP));

        Ok(())
    }

    #[test]
    fn respects_min_subtotal() -> TestResult {
        let discount = coupon(&[
            ("code", "BIG"),
            ("amount_off", "5.00 GBP"),
            ("min_subtotal", "20.00 GBP"),
        ]);

        let (small, small_applied) = run(
            &CouponFactory,
            &discount,
            gbp_line(1000, 1)?.with_coupon("BIG"),
        )?;
        let (large, large_applied) = run(
            &CouponFactory,
            &discount,
            gbp_line(1000, 2)?.with_coupon("BIG"),
        )?;

        assert_eq!(small.total(), &Money::from_minor(1000, GBP));
        assert!(small_applied.is_empty());
        assert_eq!(large.total(), &Money::from_minor(1500, GBP));
        assert_eq!(large_applied.len(), 1);

        Ok(())
    }

    #[test]
    fn threshold_in_other_currency_is_an_error() -> TestResult {
        let discount = coupon(&[
            ("code", "BIG"),
            ("amount_off", "5.00 GBP"),
            ("min_subtotal", "20.00 USD"),
        ]);

        let result = run(
            &CouponFactory,
            &discount,
            gbp_line(1000, 1)?.with_coupon("BIG"),
        );

        assert_eq!(
            result.err(),
            Some(StrategyError::Money(MoneyError::CurrencyMismatch {
                expected: GBP.iso_alpha_code,
                actual: USD.iso_alpha_code,
            }))
        );

        Ok(())
    }

    #[test]
    fn missing_code_is_a_data_error() {
        let discount = coupon(&[("percentage", "10%")]);

        assert_eq!(
            CouponFactory.build(&discount).err(),
            Some(DataError::MissingParameter("code".to_string()))
        );
    }

    #[test]
    fn amount_override_is_not_a_coupon_adjustment() {
        let discount = coupon(&[("code", "X"), ("amount_override", "1.00 GBP")]);

        assert_eq!(
            CouponFactory.build(&discount).err(),
            Some(DataError::ExpectedOneOf(LineAdjustment::REDUCTION_PARAMS))
        );
    }

    #[test]
    fn negative_percentage_is_a_data_error() {
        let discount = coupon(&[("code", "UP"), ("percentage", "-50%")]);

        assert!(matches!(
            CouponFactory.build(&discount),
            Err(DataError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn zero_total_is_not_recorded() -> TestResult {
        let discount = coupon(&[("code", "FREE"), ("amount_off", "1.00 GBP")]);
        let mut line = gbp_line(100, 1)?.with_coupon("FREE");
        line.set_total(Money::from_minor(0, GBP));

        let (_, applied) = run(&CouponFactory, &discount, line)?;

        assert!(applied.is_empty());

        Ok(())
    }
}
