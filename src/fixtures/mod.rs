//! Fixtures
//!
//! YAML fixture sets: `products/<set>.yml`, `carts/<set>.yml` and `discounts/<set>.yml` under a
//! base path.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    discounts::{
        Discount, DiscountKey,
        data::{DataError, parse_price},
    },
    fixtures::{carts::CartFixture, discounts::DiscountsFixture, products::ProductsFixture},
    products::{Product, ProductKey},
    store::InMemoryDiscountStore,
};

pub mod carts;
pub mod discounts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price or other value
    #[error(transparent)]
    Data(#[from] DataError),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Discount not found
    #[error("Discount not found: {0}")]
    DiscountNotFound(String),

    /// Two discounts share a fixture id
    #[error("Duplicate discount id: {0}")]
    DuplicateDiscount(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// A loaded product catalogue, cart and discount store.
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    products: SlotMap<ProductKey, Product<'a>>,
    product_keys: FxHashMap<String, ProductKey>,

    store: InMemoryDiscountStore,
    discount_keys: FxHashMap<String, DiscountKey>,

    /// Cart lines as (product, quantity), in cart order
    cart_lines: Vec<(ProductKey, u32)>,
    coupons: Vec<String>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            store: InMemoryDiscountStore::new(),
            discount_keys: FxHashMap::default(),
            cart_lines: Vec::new(),
            coupons: Vec::new(),
            currency: None,
        }
    }

    fn read(&self, category: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));

        debug!(path = %file_path.display(), "reading fixture");

        Ok(fs::read_to_string(&file_path)?)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = serde_norway::from_str(&self.read("products", name)?)?;

        for (key, product_fixture) in fixture.products {
            let (_minor_units, currency) = parse_price(&product_fixture.price)?;

            match self.currency {
                Some(existing) if existing != currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => self.currency = Some(currency),
            }

            let product: Product<'a> = product_fixture.try_into()?;
            let product_key = self.products.insert(product);

            self.product_keys.insert(key, product_key);
        }

        Ok(self)
    }

    /// Load the cart from a YAML fixture file. Products must be loaded first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = serde_norway::from_str(&self.read("carts", name)?)?;

        for line in fixture.lines {
            let product_key = self.product_key(&line.product)?;

            self.cart_lines.push((product_key, line.quantity));
        }

        self.coupons.extend(fixture.coupons);

        Ok(self)
    }

    /// Load discounts from a YAML fixture file into the discount store
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a discount id repeats.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: DiscountsFixture = serde_norway::from_str(&self.read("discounts", name)?)?;

        for discount_fixture in fixture.discounts {
            if self.discount_keys.contains_key(&discount_fixture.id) {
                return Err(FixtureError::DuplicateDiscount(discount_fixture.id));
            }

            let id = discount_fixture.id.clone();
            let discount_key = self.store.insert(Discount::from(discount_fixture));

            self.discount_keys.insert(id, discount_key);
        }

        Ok(self)
    }

    /// Load products, cart and discounts sharing a set name
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_products(name)?
            .load_cart(name)?
            .load_discounts(name)
    }

    /// Load a complete fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'a>, FixtureError> {
        self.products
            .get(self.product_key(key)?)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a discount by its fixture id
    ///
    /// # Errors
    ///
    /// Returns an error if the discount is not found.
    pub fn discount(&self, id: &str) -> Result<&Discount, FixtureError> {
        self.store
            .get(self.discount_key(id)?)
            .ok_or_else(|| FixtureError::DiscountNotFound(id.to_string()))
    }

    /// Get a discount key by its fixture id
    ///
    /// # Errors
    ///
    /// Returns an error if the discount is not found.
    pub fn discount_key(&self, id: &str) -> Result<DiscountKey, FixtureError> {
        self.discount_keys
            .get(id)
            .copied()
            .ok_or_else(|| FixtureError::DiscountNotFound(id.to_string()))
    }

    /// The loaded discounts
    pub fn store(&self) -> &InMemoryDiscountStore {
        &self.store
    }

    /// Build a fresh cart from the loaded cart lines and coupons
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or the cart cannot be built.
    pub fn cart(&self) -> Result<Cart<'a>, FixtureError> {
        let mut cart = Cart::new(self.currency()?);

        for code in &self.coupons {
            cart.redeem_coupon(code);
        }

        for &(product_key, quantity) in &self.cart_lines {
            let product = self
                .products
                .get(product_key)
                .ok_or_else(|| FixtureError::ProductNotFound(format!("{product_key:?}")))?;

            cart.add_product(product, quantity)?;
        }

        Ok(cart)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
