//! Utils

use std::path::PathBuf;

use clap::Parser;
use jiff::Timestamp;

/// Arguments for the `reprice` binary
#[derive(Debug, Parser)]
#[command(name = "reprice", about = "Reprice a fixture cart against its discounts", long_about = None)]
pub struct RepriceArgs {
    /// Fixture set to use for the products, cart & discounts
    #[clap(short, long, default_value = "grocery")]
    pub fixture: String,

    /// Directory holding the `products`, `carts` and `discounts` fixture folders
    #[clap(short, long, default_value = "./fixtures")]
    pub base_path: PathBuf,

    /// Instant to evaluate discount windows at (RFC 3339); defaults to now
    #[clap(short, long)]
    pub at: Option<Timestamp>,

    /// Evaluator configuration file (YAML)
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// List the registered discount types and exit
    #[clap(short, long)]
    pub list_types: bool,
}
