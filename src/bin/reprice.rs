//! Reprice
//!
//! Loads a fixture set, reprices its cart against the fixture discounts and prints a receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-a` to evaluate discount windows at a fixed instant
//! Use `-c` to load evaluator configuration from a YAML file

use std::io;

use anyhow::Result;
use clap::Parser;
use reprice::{
    config::EvaluatorConfig, evaluator::DiscountEvaluator, fixtures::Fixture, receipt::Receipt,
    registry::DiscountRegistry, utils::RepriceArgs,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Reprice a fixture cart
#[expect(clippy::print_stdout, reason = "CLI output")]
pub fn main() -> Result<()> {
    let args = RepriceArgs::parse();

    let config = match &args.config {
        Some(path) => EvaluatorConfig::load(path)?,
        None => EvaluatorConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let registry = DiscountRegistry::with_builtins();

    if args.list_types {
        for factory in registry.list_types() {
            println!("{:<20} {}", factory.tag(), factory.label());
        }

        return Ok(());
    }

    let mut fixture = Fixture::with_base_path(&args.base_path);
    fixture.load_set(&args.fixture)?;

    let mut cart = fixture.cart()?;
    let mut evaluator = DiscountEvaluator::new(&registry, fixture.store()).with_config(config);

    if let Some(at) = args.at {
        evaluator = evaluator.at(at);
    }

    let active = evaluator.preload()?;

    info!(
        fixture = %args.fixture,
        at = %evaluator.evaluated_at(),
        active,
        "repricing cart"
    );

    cart.reprice(&mut evaluator)?;

    let applied = evaluator.into_applied();
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::from_cart(&cart, &applied)?.write_to(&mut handle)?;

    Ok(())
}
