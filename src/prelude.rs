//! Reprice prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    config::{ConfigError, EvaluatorConfig, StrategyErrorPolicy},
    discounts::{
        Discount, DiscountKey,
        applied::{AppliedDiscount, AppliedDiscounts},
        data::{DataError, DiscountData},
        restrictions::Restrictions,
        window::ActiveWindow,
    },
    evaluator::{DiscountEvaluator, EvaluatorError},
    lines::{CartLine, LineError, LineKey},
    products::{Product, ProductKey},
    receipt::{Receipt, ReceiptError},
    registry::DiscountRegistry,
    store::{DiscountSource, InMemoryDiscountStore, SourceError},
    strategies::{
        BuyXGetYFactory, CouponFactory, DiscountStrategy, ProductDiscountFactory,
        StrategyContext, StrategyError, StrategyFactory,
    },
    tags::TagSet,
};
