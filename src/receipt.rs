//! Receipt

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{cart::Cart, discounts::applied::AppliedDiscounts, lines::LineKey};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Writing the receipt failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One cart line on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Key of the cart line
    pub line: LineKey,

    /// Product name
    pub name: String,

    /// Units bought
    pub quantity: u32,

    /// Line amount before discounts
    pub subtotal: Money<'a, Currency>,

    /// Line amount after discounts
    pub total: Money<'a, Currency>,

    /// Names of the discounts applied to the line, in application order
    pub discounts: SmallVec<[String; 2]>,
}

impl<'a> ReceiptLine<'a> {
    /// Amount taken off the line.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }
}

/// Final receipt for a repriced cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: Vec<ReceiptLine<'a>>,

    /// Total cost before any discounts
    subtotal: Money<'a, Currency>,

    /// Total amount paid after discounts
    total: Money<'a, Currency>,

    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a repriced cart and the log of discounts applied to it.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the cart totals cannot be calculated.
    pub fn from_cart(cart: &Cart<'a>, applied: &AppliedDiscounts<'a>) -> Result<Self, ReceiptError> {
        let lines = cart
            .lines()
            .map(|line| ReceiptLine {
                line: line.key(),
                name: line.name().to_string(),
                quantity: line.quantity(),
                subtotal: *line.subtotal(),
                total: *line.total(),
                discounts: applied
                    .for_line(line.key())
                    .map(|record| record.discount_name.clone())
                    .collect(),
            })
            .collect();

        Ok(Self {
            lines,
            subtotal: cart.subtotal()?,
            total: cart.total()?,
            currency: cart.currency(),
        })
    }

    /// Receipt lines in cart order
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Total cost before any discounts
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total amount paid for all lines
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency used for all monetary values
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Calculate the savings made by applying discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Savings as a fraction of the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ONE);

        Ok(Percentage::from(savings_dec / subtotal_dec))
    }

    /// Write the receipt table and summary.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line's savings cannot be calculated or writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "Item",
            "Qty",
            "Base Price",
            "Discounted Price",
            "Savings",
            "Discounts",
        ]);

        for line in &self.lines {
            let savings = line.savings()?;

            let (final_price, savings) = if line.total == line.subtotal {
                (String::new(), String::new())
            } else {
                (format!("{}", line.total), format!("-{savings}"))
            };

            builder.push_record([
                line.name.clone(),
                line.quantity.to_string(),
                format!("{}", line.subtotal),
                final_price,
                savings,
                line.discounts.join(", "),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::rounded());
        table.modify(Columns::new(1..5), Alignment::right());

        writeln!(out, "\n{table}")?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let percent_points = percent_points(self.savings_percent()?);

        let rows = [
            ("Subtotal:", format!("{}", self.subtotal)),
            ("Total:", format!("{}", self.total)),
            ("Savings:", format!("({percent_points:.2}%) {}", self.savings()?)),
        ];

        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:>9}  {value:>value_width$}")?;
        }

        writeln!(out)?;

        Ok(())
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        discounts::{Discount, restrictions::Restrictions},
        evaluator::DiscountEvaluator,
        products::Product,
        registry::DiscountRegistry,
        store::InMemoryDiscountStore,
        tags::TagSet,
    };

    use super::*;

    fn repriced_cart<'a>() -> Result<(Cart<'a>, AppliedDiscounts<'a>), Box<dyn std::error::Error>> {
        let registry = DiscountRegistry::with_builtins();
        let mut store = InMemoryDiscountStore::new();
        store.insert(
            Discount::new("Fruit Sale", "product_discount", 1)
                .with_param("percentage", "20%")
                .with_restrictions(Restrictions::collections(&["fruit"])),
        );

        let mut cart = Cart::new(GBP);
        cart.add_product(
            &Product::new("Apple", Money::from_minor(100, GBP))
                .with_collections(TagSet::from_strs(&["fruit"])),
            2,
        )?;
        cart.add_product(&Product::new("Bread", Money::from_minor(150, GBP)), 1)?;

        let mut evaluator = DiscountEvaluator::new(&registry, &store);
        cart.reprice(&mut evaluator)?;

        Ok((cart, evaluator.into_applied()))
    }

    #[test]
    fn from_cart_collects_totals_and_names() -> TestResult {
        let (cart, applied) = repriced_cart()?;

        let receipt = Receipt::from_cart(&cart, &applied)?;

        assert_eq!(receipt.subtotal(), Money::from_minor(350, GBP));
        assert_eq!(receipt.total(), Money::from_minor(310, GBP));
        assert_eq!(receipt.savings()?, Money::from_minor(40, GBP));
        assert_eq!(receipt.currency(), GBP);

        let counts: Vec<usize> = receipt.lines().iter().map(|line| line.discounts.len()).collect();

        assert_eq!(counts, [1, 0]);
        assert_eq!(
            receipt.lines().first().and_then(|line| line.discounts.first()),
            Some(&"Fruit Sale".to_string())
        );

        Ok(())
    }

    #[test]
    fn savings_percent_is_zero_for_empty_cart() -> TestResult {
        let cart = Cart::new(GBP);

        let receipt = Receipt::from_cart(&cart, &AppliedDiscounts::new())?;

        assert_eq!(receipt.savings_percent()?, Percentage::from(0.0));

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_summary() -> TestResult {
        let (cart, applied) = repriced_cart()?;
        let receipt = Receipt::from_cart(&cart, &applied)?;

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Apple"));
        assert!(output.contains("Bread"));
        assert!(output.contains("Fruit Sale"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("Total:"));
        assert!(output.contains("(11.43%)"));

        Ok(())
    }

    #[test]
    fn percent_points_converts_fraction() {
        assert_eq!(
            percent_points(Percentage::from(0.25)),
            Decimal::from_i64(25).unwrap_or_default()
        );
    }
}
