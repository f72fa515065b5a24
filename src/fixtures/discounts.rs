//! Discount Fixtures

use serde::Deserialize;

use crate::discounts::{
    Discount, data::DiscountData, restrictions::Restrictions, window::ActiveWindow,
};

/// Wrapper for discounts in YAML.
///
/// Discounts are a list so that stored keys, and with them equal-priority ordering, follow file
/// order.
#[derive(Debug, Deserialize)]
pub struct DiscountsFixture {
    /// Discounts in file order
    pub discounts: Vec<DiscountFixture>,
}

/// Discount fixture from YAML
#[derive(Debug, Deserialize)]
pub struct DiscountFixture {
    /// Fixture key used to look the discount up
    pub id: String,

    /// Display name
    pub name: String,

    /// Strategy type tag
    #[serde(rename = "type")]
    pub kind: String,

    /// Evaluation order, lower first
    #[serde(default)]
    pub priority: i32,

    /// Whether the discount is switched on
    #[serde(default = "default_active")]
    pub active: bool,

    /// `starts_at` / `ends_at` bounds
    #[serde(flatten)]
    pub window: ActiveWindow,

    /// Strategy parameters
    #[serde(default)]
    pub data: DiscountData,

    /// Brand and collection restrictions
    #[serde(default)]
    pub restrictions: Restrictions,
}

fn default_active() -> bool {
    true
}

impl From<DiscountFixture> for Discount {
    fn from(fixture: DiscountFixture) -> Self {
        Discount::new(fixture.name, fixture.kind, fixture.priority)
            .with_active(fixture.active)
            .with_window(fixture.window)
            .with_data(fixture.data)
            .with_restrictions(fixture.restrictions)
    }
}
