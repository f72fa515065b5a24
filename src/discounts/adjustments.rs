//! Line Adjustments
//!
//! Price changes shared by the built-in strategies. All arithmetic happens in minor units and the
//! resulting totals never drop below zero.

use decimal_percentage::Percentage;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::data::{DataError, DiscountData},
    lines::{CartLine, LineError, line_amount},
};

/// Errors specific to adjustment calculations.
#[derive(Debug, Error, PartialEq)]
pub enum AdjustmentError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Per-unit amount overflowed when scaled by quantity.
    #[error(transparent)]
    Line(#[from] LineError),
}

/// Whether a fixed amount is taken per unit or once per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentScope {
    /// Scaled by the line quantity
    Unit,

    /// Taken once from the line total
    Line,
}

/// A single price change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineAdjustment {
    /// Take a percentage off the current total (e.g., "25% off")
    PercentageOff(Percentage),

    /// Subtract a fixed amount (e.g., "£2 off")
    AmountOff(Money<'static, Currency>),

    /// Replace the price with a fixed amount (e.g., "£5 each"), if that is lower
    AmountOverride(Money<'static, Currency>),
}

impl LineAdjustment {
    /// Parameter names; exactly one must be present in the discount data.
    pub const PARAMS: &'static [&'static str] = &["percentage", "amount_off", "amount_override"];

    /// Adjustment parameters that reduce the current total; no price override.
    pub const REDUCTION_PARAMS: &'static [&'static str] = &["percentage", "amount_off"];

    /// Read the adjustment from discount data, accepting any of [`Self::PARAMS`].
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ExpectedOneOf`] unless exactly one adjustment parameter is present, or
    /// a parse error for its value.
    pub fn from_data(data: &DiscountData) -> Result<Self, DataError> {
        Self::from_data_with(data, Self::PARAMS)
    }

    /// Read the adjustment from discount data, accepting only the parameters in `params`.
    ///
    /// Parameters outside `params` are counted too, so a stray `amount_override` on a discount
    /// that only takes reductions is rejected rather than ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ExpectedOneOf`] unless exactly one parameter is present and it is one
    /// of `params`, or a parse error for its value.
    pub fn from_data_with(
        data: &DiscountData,
        params: &'static [&'static str],
    ) -> Result<Self, DataError> {
        let present: Vec<&str> = Self::PARAMS
            .iter()
            .copied()
            .filter(|param| data.contains(param))
            .collect();

        match present.as_slice() {
            [param] if !params.contains(param) => Err(DataError::ExpectedOneOf(params)),
            ["percentage"] => Ok(Self::PercentageOff(data.percentage("percentage")?)),
            ["amount_off"] => Ok(Self::AmountOff(data.money("amount_off")?)),
            ["amount_override"] => Ok(Self::AmountOverride(data.money("amount_override")?)),
            _ => Err(DataError::ExpectedOneOf(params)),
        }
    }

    /// Calculate the line total after this adjustment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Percentage calculation overflows or cannot be safely represented.
    /// - Money arithmetic fails (e.g., currency mismatch).
    pub fn adjusted_total<'a>(
        &self,
        line: &CartLine<'a>,
        scope: AdjustmentScope,
    ) -> Result<Money<'a, Currency>, AdjustmentError> {
        let total = *line.total();

        let adjusted = match self {
            LineAdjustment::PercentageOff(pct) => {
                let original_minor = total.to_minor_units();

                let discounted_minor = original_minor
                    .checked_sub(percent_of_minor(pct, original_minor)?)
                    .ok_or(AdjustmentError::PercentConversion)?;

                Money::from_minor(discounted_minor, total.currency())
            }
            LineAdjustment::AmountOff(amount) => {
                total.sub(scaled(amount, line.quantity(), scope)?)?
            }
            LineAdjustment::AmountOverride(amount) => {
                let target = scaled(amount, line.quantity(), scope)?;

                ensure_currency(&total, &target)?;

                if target.to_minor_units() < total.to_minor_units() {
                    target
                } else {
                    total
                }
            }
        };

        Ok(non_negative(adjusted))
    }
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`AdjustmentError::PercentConversion`] if the calculation overflows or cannot be
/// represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, AdjustmentError> {
    let minor = Decimal::from_i64(minor).ok_or(AdjustmentError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(AdjustmentError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AdjustmentError::PercentConversion)
}

/// Fail with a currency mismatch unless both amounts share a currency.
///
/// # Errors
///
/// Returns [`MoneyError::CurrencyMismatch`] if the currencies differ.
pub fn ensure_currency(
    expected: &Money<'_, Currency>,
    actual: &Money<'_, Currency>,
) -> Result<(), MoneyError> {
    if expected.currency() == actual.currency() {
        Ok(())
    } else {
        Err(MoneyError::CurrencyMismatch {
            expected: expected.currency().iso_alpha_code,
            actual: actual.currency().iso_alpha_code,
        })
    }
}

fn scaled<'a>(
    amount: &Money<'a, Currency>,
    quantity: u32,
    scope: AdjustmentScope,
) -> Result<Money<'a, Currency>, LineError> {
    match scope {
        AdjustmentScope::Unit => line_amount(amount, quantity),
        AdjustmentScope::Line => Ok(*amount),
    }
}

fn non_negative(money: Money<'_, Currency>) -> Money<'_, Currency> {
    if money.to_minor_units() < 0 {
        Money::from_minor(0, money.currency())
    } else {
        money
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::lines::LineKey;

    use super::*;

    fn line<'a>(unit_minor: i64, quantity: u32) -> Result<CartLine<'a>, LineError> {
        CartLine::new(
            LineKey::default(),
            "Item",
            Money::from_minor(unit_minor, GBP),
            quantity,
        )
    }

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        assert_eq!(percent_of_minor(&Percentage::from(0.25), 200)?, 50);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(percent_of_minor(&Percentage::from(0.5), 5)?, 3);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let result = percent_of_minor(&Percentage::from(2.0), i64::MAX);

        assert!(matches!(result, Err(AdjustmentError::PercentConversion)));
    }

    #[test]
    fn percentage_off_applies_to_current_total() -> TestResult {
        let mut line = line(100, 2)?;
        line.set_total(Money::from_minor(150, GBP));

        let adjustment = LineAdjustment::PercentageOff(Percentage::from(0.1));

        assert_eq!(
            adjustment.adjusted_total(&line, AdjustmentScope::Line)?,
            Money::from_minor(135, GBP)
        );

        Ok(())
    }

    #[test]
    fn amount_off_scales_per_unit() -> TestResult {
        let line = line(300, 3)?;
        let adjustment = LineAdjustment::AmountOff(Money::from_minor(50, GBP));

        assert_eq!(
            adjustment.adjusted_total(&line, AdjustmentScope::Unit)?,
            Money::from_minor(750, GBP)
        );
        assert_eq!(
            adjustment.adjusted_total(&line, AdjustmentScope::Line)?,
            Money::from_minor(850, GBP)
        );

        Ok(())
    }

    #[test]
    fn amount_off_clamps_to_zero() -> TestResult {
        let line = line(100, 1)?;
        let adjustment = LineAdjustment::AmountOff(Money::from_minor(500, GBP));

        assert_eq!(
            adjustment.adjusted_total(&line, AdjustmentScope::Line)?,
            Money::from_minor(0, GBP)
        );

        Ok(())
    }

    #[test]
    fn amount_override_only_lowers_total() -> TestResult {
        let line = line(200, 2)?;

        let lower = LineAdjustment::AmountOverride(Money::from_minor(150, GBP));
        let higher = LineAdjustment::AmountOverride(Money::from_minor(250, GBP));

        assert_eq!(
            lower.adjusted_total(&line, AdjustmentScope::Unit)?,
            Money::from_minor(300, GBP)
        );
        assert_eq!(
            higher.adjusted_total(&line, AdjustmentScope::Unit)?,
            Money::from_minor(400, GBP)
        );

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_reported() -> TestResult {
        let line = line(200, 1)?;
        let adjustment = LineAdjustment::AmountOverride(Money::from_minor(100, USD));

        assert_eq!(
            adjustment.adjusted_total(&line, AdjustmentScope::Line),
            Err(AdjustmentError::Money(MoneyError::CurrencyMismatch {
                expected: GBP.iso_alpha_code,
                actual: USD.iso_alpha_code,
            }))
        );

        Ok(())
    }

    #[test]
    fn from_data_requires_exactly_one_adjustment() -> TestResult {
        let none = DiscountData::default();
        let both: DiscountData = [("percentage", "10%"), ("amount_off", "1.00 GBP")]
            .into_iter()
            .collect();
        let one: DiscountData = [("amount_off", "1.00 GBP")].into_iter().collect();

        assert_eq!(
            LineAdjustment::from_data(&none),
            Err(DataError::ExpectedOneOf(LineAdjustment::PARAMS))
        );
        assert_eq!(
            LineAdjustment::from_data(&both),
            Err(DataError::ExpectedOneOf(LineAdjustment::PARAMS))
        );
        assert_eq!(
            LineAdjustment::from_data(&one)?,
            LineAdjustment::AmountOff(Money::from_minor(100, GBP))
        );

        Ok(())
    }

    #[test]
    fn from_data_with_rejects_parameters_outside_the_allowed_set() -> TestResult {
        let override_only: DiscountData = [("amount_override", "1.00 GBP")].into_iter().collect();
        let percent: DiscountData = [("percentage", "10%")].into_iter().collect();

        assert_eq!(
            LineAdjustment::from_data_with(&override_only, LineAdjustment::REDUCTION_PARAMS),
            Err(DataError::ExpectedOneOf(LineAdjustment::REDUCTION_PARAMS))
        );
        assert_eq!(
            LineAdjustment::from_data_with(&percent, LineAdjustment::REDUCTION_PARAMS)?,
            LineAdjustment::PercentageOff(Percentage::from(Decimal::new(1, 1)))
        );

        Ok(())
    }
}
