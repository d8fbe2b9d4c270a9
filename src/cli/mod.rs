use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

pub mod formatters;

use crate::utils::parse_decimal;

#[derive(Parser, Debug)]
#[command(name = "importcost")]
#[command(
    version,
    about = "Brazilian import landed-cost and marketplace margin calculator"
)]
#[command(
    long_about = "Compute the landed cost of an import (Imposto de Importação + ICMS por dentro) under full and reduced invoice declarations, and the per-unit margin when reselling on Shopee, Mercado Livre or any configured marketplace."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to a config file (default: IMPORTCOST_CONFIG, then the user config dir)
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Landed cost under every declaration scenario, plus marketplace margins
    Quote {
        #[command(flatten)]
        inputs: InputArgs,

        /// Scenario whose unit cost feeds the margins (e.g. full, reduced)
        #[arg(short, long)]
        scenario: Option<String>,

        /// Compute even when inputs are out of range
        #[arg(long)]
        force: bool,
    },

    /// Margin of a single sale
    Margin {
        /// Selling price in BRL
        #[arg(value_parser = parse_decimal_arg)]
        selling_price: Decimal,

        /// Landed cost per unit in BRL
        #[arg(value_parser = parse_decimal_arg)]
        unit_cost: Decimal,

        /// Use the fee schedule of this configured marketplace
        #[arg(short, long, conflicts_with_all = ["fee_percent", "fixed_fee", "threshold"])]
        marketplace: Option<String>,

        /// Commission as a fraction (0.20 for 20%)
        #[arg(long, value_parser = parse_decimal_arg, requires = "fixed_fee")]
        fee_percent: Option<Decimal>,

        /// Flat fee charged below the threshold
        #[arg(long, value_parser = parse_decimal_arg, requires = "fee_percent")]
        fixed_fee: Option<Decimal>,

        /// Price below which the flat fee applies (default 79)
        #[arg(long, value_parser = parse_decimal_arg)]
        threshold: Option<Decimal>,
    },

    /// Quote every line of a CSV file
    Batch {
        /// Path to the CSV file
        file: PathBuf,

        /// Scenario whose unit cost feeds the margins
        #[arg(short, long)]
        scenario: Option<String>,
    },

    /// List configured declaration scenarios
    Scenarios,

    /// List configured marketplace fee schedules
    Marketplaces,

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Shipment inputs; anything omitted comes from the config defaults
#[derive(clap::Args, Debug, Default)]
pub struct InputArgs {
    /// Number of units in the shipment
    #[arg(short, long)]
    pub quantity: Option<u32>,

    /// Supplier price per unit in USD
    #[arg(short, long, value_parser = parse_decimal_arg)]
    pub unit_price: Option<Decimal>,

    /// Total freight for the shipment in USD
    #[arg(short, long, value_parser = parse_decimal_arg)]
    pub freight: Option<Decimal>,

    /// USD to BRL exchange rate
    #[arg(short, long, value_parser = parse_decimal_arg)]
    pub exchange_rate: Option<Decimal>,

    /// State ICMS rate in percent (e.g. 19)
    #[arg(short, long, value_parser = parse_decimal_arg)]
    pub icms: Option<Decimal>,

    /// Selling price on a marketplace, as id=value (e.g. --price shopee=149.90)
    #[arg(short, long = "price", value_parser = parse_price_arg)]
    pub prices: Vec<(String, Decimal)>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the config file location
    Path,

    /// Print the effective configuration
    Show,

    /// Write the built-in defaults to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_decimal_arg(s: &str) -> Result<Decimal, String> {
    parse_decimal(s).ok_or_else(|| format!("'{}' is not a number", s))
}

fn parse_price_arg(s: &str) -> Result<(String, Decimal), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected MARKETPLACE=PRICE, got '{}'", s))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing marketplace id in '{}'", s));
    }
    Ok((id.to_ascii_lowercase(), parse_decimal_arg(value)?))
}
