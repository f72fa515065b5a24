//! Reprice
//!
//! Reprice is a discount evaluation engine: a registry of discount strategies keyed by type tag,
//! and an evaluator that threads cart lines through every active discount in priority order while
//! keeping a log of which discounts changed which lines.

pub mod cart;
pub mod config;
pub mod discounts;
pub mod evaluator;
pub mod fixtures;
pub mod lines;
pub mod prelude;
pub mod products;
pub mod receipt;
pub mod registry;
pub mod store;
pub mod strategies;
pub mod tags;
pub mod utils;
