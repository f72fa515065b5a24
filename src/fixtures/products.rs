//! Product Fixtures

use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;

use crate::{discounts::data::parse_price, fixtures::FixtureError, products::Product, tags::TagSet};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Price in format "2.99 GBP"
    pub price: String,

    /// Optional brand
    #[serde(default)]
    pub brand: Option<String>,

    /// Collections the product belongs to
    #[serde(default)]
    pub collections: TagSet,
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product {
            name: fixture.name,
            brand: fixture.brand,
            collections: fixture.collections,
            price: Money::from_minor(minor_units, currency),
        })
    }
}
