//! Cart Fixtures

use serde::Deserialize;

/// Cart fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Coupon codes redeemed against the cart
    #[serde(default)]
    pub coupons: Vec<String>,

    /// Lines in cart order
    pub lines: Vec<CartLineFixture>,
}

/// A cart line referencing a product fixture by key
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product key from the products fixture
    pub product: String,

    /// Units bought
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn quantity_defaults_to_one() -> TestResult {
        let fixture: CartFixture =
            serde_norway::from_str("lines:\n  - product: apple\n  - product: pear\n    quantity: 3\n")?;

        let quantities: Vec<u32> = fixture.lines.iter().map(|line| line.quantity).collect();

        assert_eq!(quantities, [1, 3]);
        assert!(fixture.coupons.is_empty());

        Ok(())
    }
}
