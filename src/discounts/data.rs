//! Discount Data
//!
//! Strategy-specific parameters stored on a discount as plain strings, with typed accessors that
//! report missing or malformed values.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading discount parameters.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    /// A required parameter is absent.
    #[error("missing parameter `{0}`")]
    MissingParameter(String),

    /// None or more than one of a set of mutually exclusive parameters is present.
    #[error("expected exactly one of {0:?}")]
    ExpectedOneOf(&'static [&'static str]),

    /// Invalid price format
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),

    /// Invalid count
    #[error("invalid count for `{param}`: {value}")]
    InvalidCount {
        /// Parameter name
        param: String,

        /// Raw value
        value: String,
    },

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Strategy-specific discount parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DiscountData {
    params: FxHashMap<String, String>,
}

impl DiscountData {
    /// Set a parameter, replacing any previous value.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.params.insert(name.to_string(), value.to_string());
    }

    /// Raw parameter value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Whether a parameter is present.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Raw parameter value, required.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingParameter`] if the parameter is absent.
    pub fn require(&self, name: &str) -> Result<&str, DataError> {
        self.get(name)
            .ok_or_else(|| DataError::MissingParameter(name.to_string()))
    }

    /// Money parameter such as `"5.00 USD"`. Negative amounts are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is absent, not a valid price, or negative.
    pub fn money(&self, name: &str) -> Result<Money<'static, Currency>, DataError> {
        let raw = self.require(name)?;
        let (minor, currency) = parse_price(raw)?;

        if minor < 0 {
            return Err(DataError::InvalidPrice(format!("`{name}` must not be negative: {raw}")));
        }

        Ok(Money::from_minor(minor, currency))
    }

    /// Optional money parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is present but not a valid price.
    pub fn optional_money(&self, name: &str) -> Result<Option<Money<'static, Currency>>, DataError> {
        if self.contains(name) {
            self.money(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Percentage parameter such as `"15%"` or `"0.15"`. Negative percentages are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is absent, not a valid percentage, or negative.
    pub fn percentage(&self, name: &str) -> Result<Percentage, DataError> {
        let raw = self.require(name)?;

        if parse_fraction(raw)?.is_sign_negative() {
            return Err(DataError::InvalidPercentage(format!(
                "`{name}` must not be negative: {raw}"
            )));
        }

        parse_percentage(raw)
    }

    /// Positive whole number parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is absent, not a number, or zero.
    pub fn count(&self, name: &str) -> Result<u32, DataError> {
        let raw = self.require(name)?;

        match raw.trim().parse::<u32>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(DataError::InvalidCount {
                param: name.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Optional positive whole number parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is present but invalid.
    pub fn optional_count(&self, name: &str) -> Result<Option<u32>, DataError> {
        if self.contains(name) {
            self.count(name).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DiscountData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), DataError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DataError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency =
        iso::find(code).ok_or_else(|| DataError::UnknownCurrency(code.to_string()))?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| DataError::InvalidPrice(s.to_string()))?;

    let scale = Decimal::from(10_i64.pow(currency.exponent));

    let minor_units = amount
        .checked_mul(scale)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| DataError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, DataError> {
    parse_fraction(s).map(Percentage::from)
}

fn parse_fraction(s: &str) -> Result<Decimal, DataError> {
    let trimmed = s.trim();

    let (raw, divisor) = match trimmed.strip_suffix('%') {
        Some(points) => (points.trim(), Decimal::ONE_HUNDRED),
        None => (trimmed, Decimal::ONE),
    };

    let value = raw
        .parse::<Decimal>()
        .map_err(|_err| DataError::InvalidPercentage(s.to_string()))?;

    value
        .checked_div(divisor)
        .ok_or_else(|| DataError::InvalidPercentage(s.to_string()))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, JPY, USD};
    use testresult::TestResult;

    use super::*;

    fn data(pairs: &[(&str, &str)]) -> DiscountData {
        pairs.iter().copied().collect()
    }

    #[test]
    fn parse_price_handles_decimal_amounts() -> TestResult {
        assert_eq!(parse_price("2.99 GBP")?, (299, GBP));
        assert_eq!(parse_price("5 USD")?, (500, USD));

        Ok(())
    }

    #[test]
    fn parse_price_respects_currency_exponent() -> TestResult {
        assert_eq!(parse_price("500 JPY")?, (500, JPY));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_bad_input() {
        assert!(matches!(
            parse_price("2.99"),
            Err(DataError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("abc GBP"),
            Err(DataError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("2.99 XYZ"),
            Err(DataError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        assert_eq!(parse_percentage("15%")?, Percentage::from(Decimal::new(15, 2)));
        assert_eq!(parse_percentage("0.15")?, Percentage::from(Decimal::new(15, 2)));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_garbage() {
        assert!(matches!(
            parse_percentage("lots"),
            Err(DataError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn require_reports_missing_parameter() {
        let data = data(&[("code", "SPRING")]);

        assert_eq!(data.require("code"), Ok("SPRING"));
        assert_eq!(
            data.require("amount_off"),
            Err(DataError::MissingParameter("amount_off".to_string()))
        );
    }

    #[test]
    fn optional_money_is_none_when_absent() -> TestResult {
        let data = data(&[("min_subtotal", "20.00 GBP")]);

        assert_eq!(
            data.optional_money("min_subtotal")?,
            Some(Money::from_minor(2000, GBP))
        );
        assert_eq!(data.optional_money("other")?, None);

        Ok(())
    }

    #[test]
    fn negative_amounts_and_percentages_are_rejected() -> TestResult {
        let data = data(&[
            ("amount_off", "-2.00 GBP"),
            ("percentage", "-50%"),
            ("fraction", "-0.5"),
            ("zero", "0%"),
        ]);

        assert!(matches!(
            data.money("amount_off"),
            Err(DataError::InvalidPrice(_))
        ));
        assert!(matches!(
            data.percentage("percentage"),
            Err(DataError::InvalidPercentage(_))
        ));
        assert!(matches!(
            data.percentage("fraction"),
            Err(DataError::InvalidPercentage(_))
        ));
        assert_eq!(data.percentage("zero")?, Percentage::from(Decimal::ZERO));

        Ok(())
    }

    #[test]
    fn count_rejects_zero_and_garbage() -> TestResult {
        let data = data(&[("buy", "2"), ("zero", "0"), ("bad", "two")]);

        assert_eq!(data.count("buy")?, 2);
        assert!(matches!(
            data.count("zero"),
            Err(DataError::InvalidCount { .. })
        ));
        assert!(matches!(
            data.count("bad"),
            Err(DataError::InvalidCount { .. })
        ));

        Ok(())
    }

    #[test]
    fn deserializes_from_yaml_map() -> TestResult {
        let data: DiscountData = serde_norway::from_str("code: SPRING\npercentage: \"10%\"")?;

        assert_eq!(data.get("code"), Some("SPRING"));
        assert_eq!(data.percentage("percentage")?, Percentage::from(Decimal::new(1, 1)));

        Ok(())
    }
}
