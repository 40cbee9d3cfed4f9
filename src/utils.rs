//! Utils

use clap::Parser;

/// Arguments for the cart demo
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// Fixture set to load the catalog, allowances & config from
    #[clap(short, long, default_value = "salads")]
    pub fixture: String,

    /// Comma-separated allergies to warn about
    #[clap(short, long, value_delimiter = ',')]
    pub allergies: Vec<String>,

    /// Discount to apply, e.g. "2.50 GBP"
    #[clap(short, long)]
    pub discount: Option<String>,

    /// Output file path for the order payload JSON
    #[clap(short, long)]
    pub out: Option<String>,
}
