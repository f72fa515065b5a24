//! Discount Evaluator
//!
//! Threads a cart line through every active discount in priority order and keeps the log of
//! discounts that changed it.

use jiff::Timestamp;
use thiserror::Error;
use tracing::{Span, debug, warn};

use crate::{
    config::EvaluatorConfig,
    discounts::{Discount, DiscountKey, applied::AppliedDiscounts},
    lines::CartLine,
    registry::DiscountRegistry,
    store::{DiscountSource, SourceError},
    strategies::{DiscountStrategy, StrategyContext, StrategyError},
};

/// Errors raised while evaluating discounts
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// A discount's type tag has no registered strategy.
    #[error("discount {name:?} ({discount:?}) has unregistered type {tag:?}")]
    UnknownDiscountType {
        /// Key of the offending discount
        discount: DiscountKey,

        /// Name of the offending discount
        name: String,

        /// The unregistered type tag
        tag: String,
    },

    /// A strategy failed and the evaluator is configured to fail fast.
    #[error("discount {name:?} ({discount:?}) failed: {source}")]
    Strategy {
        /// Key of the failing discount
        discount: DiscountKey,

        /// Name of the failing discount
        name: String,

        /// Underlying strategy error
        #[source]
        source: StrategyError,
    },

    /// The discount source could not be queried.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// An active discount paired with its built strategy.
#[derive(Debug)]
struct LoadedDiscount {
    discount: Discount,
    strategy: Box<dyn DiscountStrategy>,
}

/// Evaluates cart lines against the discounts active at one instant.
///
/// The active set is loaded from the source on first use and cached for the evaluator's
/// lifetime. Build one evaluator per request or batch.
#[derive(Debug)]
pub struct DiscountEvaluator<'r, 'a, S> {
    registry: &'r DiscountRegistry,
    source: S,
    config: EvaluatorConfig,
    at: Timestamp,
    loaded: Option<Vec<LoadedDiscount>>,
    applied: AppliedDiscounts<'a>,
}

impl<'r, 'a, S: DiscountSource> DiscountEvaluator<'r, 'a, S> {
    /// Create an evaluator for the current instant with the default configuration.
    pub fn new(registry: &'r DiscountRegistry, source: S) -> Self {
        Self {
            registry,
            source,
            config: EvaluatorConfig::default(),
            at: Timestamp::now(),
            loaded: None,
            applied: AppliedDiscounts::new(),
        }
    }

    /// Set the evaluator configuration.
    #[must_use]
    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Evaluate at a fixed instant instead of now.
    #[must_use]
    pub fn at(mut self, at: Timestamp) -> Self {
        self.at = at;
        self.loaded = None;
        self
    }

    /// Instant discount windows are checked against
    pub fn evaluated_at(&self) -> Timestamp {
        self.at
    }

    /// Evaluator configuration
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Load the active discount set now, returning how many discounts will run.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluatorError`] if the source fails, a discount's type is not registered,
    /// or a strategy cannot be built under the fail-fast policy.
    pub fn preload(&mut self) -> Result<usize, EvaluatorError> {
        Ok(self.ensure_loaded()?.len())
    }

    /// The loaded discounts in the order they run. Empty until the set has been loaded.
    pub fn active_discounts(&self) -> impl Iterator<Item = &Discount> {
        self.loaded
            .iter()
            .flatten()
            .map(|loaded| &loaded.discount)
    }

    /// Run every active discount over `line` in priority order, returning the repriced line.
    ///
    /// Strategies record themselves in the applied log when they change the line. On error the
    /// log is left as it was before the call.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::UnknownDiscountType`] if an active discount's type is not
    /// registered, [`EvaluatorError::Strategy`] if a strategy fails under the fail-fast policy,
    /// or [`EvaluatorError::Source`] if the discounts cannot be loaded.
    #[tracing::instrument(
        name = "discounts.evaluator.apply",
        skip(self, line),
        fields(
            line = ?line.key(),
            at = %self.at,
            applied = tracing::field::Empty
        ),
        err
    )]
    pub fn apply(&mut self, line: &CartLine<'a>) -> Result<CartLine<'a>, EvaluatorError> {
        self.ensure_loaded()?;

        let Self {
            loaded,
            applied,
            config,
            ..
        } = self;

        let start = applied.len();
        let mut current = line.clone();

        for entry in loaded.iter().flatten() {
            let mark = applied.len();
            let original_total = *current.total();
            let mut ctx = StrategyContext::new(&entry.discount, applied, original_total);

            match entry.strategy.execute(current.clone(), &mut ctx) {
                Ok(next) => current = next,
                Err(source) if config.fail_fast() => {
                    applied.truncate(start);

                    return Err(EvaluatorError::Strategy {
                        discount: entry.discount.key(),
                        name: entry.discount.name().to_string(),
                        source,
                    });
                }
                Err(error) => {
                    applied.truncate(mark);

                    warn!(
                        discount = ?entry.discount.key(),
                        name = entry.discount.name(),
                        %error,
                        "skipping discount that failed to apply"
                    );
                }
            }
        }

        Span::current().record("applied", applied.len() - start);

        Ok(current)
    }

    /// Record that `discount` changed `line`, using the line's current total as the original.
    pub fn record_applied(&mut self, line: &mut CartLine<'a>, discount: &Discount) {
        let original_total = *line.total();

        self.applied.record(line, discount, original_total);
    }

    /// Ordered log of discounts applied so far
    pub fn applied(&self) -> &AppliedDiscounts<'a> {
        &self.applied
    }

    /// Consume the evaluator, returning the applied log.
    pub fn into_applied(self) -> AppliedDiscounts<'a> {
        self.applied
    }

    fn ensure_loaded(&mut self) -> Result<&[LoadedDiscount], EvaluatorError> {
        if self.loaded.is_none() {
            self.loaded = Some(self.load()?);
        }

        Ok(self.loaded.as_deref().unwrap_or_default())
    }

    #[tracing::instrument(
        name = "discounts.evaluator.load",
        skip(self),
        fields(at = %self.at, loaded = tracing::field::Empty),
        err
    )]
    fn load(&self) -> Result<Vec<LoadedDiscount>, EvaluatorError> {
        let mut discounts = self.source.active_discounts(self.at)?;

        discounts.retain(|discount| discount.is_live(self.at));
        discounts.sort_by_key(Discount::order_key);

        let mut loaded = Vec::with_capacity(discounts.len());

        for discount in discounts {
            let Some(factory) = self.registry.resolve(discount.kind()) else {
                return Err(EvaluatorError::UnknownDiscountType {
                    discount: discount.key(),
                    name: discount.name().to_string(),
                    tag: discount.kind().to_string(),
                });
            };

            match factory.build(&discount) {
                Ok(strategy) => loaded.push(LoadedDiscount { discount, strategy }),
                Err(error) if self.config.fail_fast() => {
                    return Err(EvaluatorError::Strategy {
                        discount: discount.key(),
                        name: discount.name().to_string(),
                        source: error.into(),
                    });
                }
                Err(error) => {
                    warn!(
                        discount = ?discount.key(),
                        name = discount.name(),
                        %error,
                        "skipping discount with malformed data"
                    );
                }
            }
        }

        Span::current().record("loaded", loaded.len());
        debug!(count = loaded.len(), "loaded active discounts");

        Ok(loaded)
    }
}
