//! Command dispatcher that routes parsed CLI commands to their handlers.
//!
//! Handlers load the configuration, call into the library and pick between
//! terminal tables and JSON for the output.

use anyhow::{bail, Context};
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::batch::{evaluate_batch, parse_batch_csv};
use crate::cli::formatters::{
    format_batch_table, format_margin, format_marketplaces_table, format_quote_table,
    format_scenarios_table, format_validation_issues,
};
use crate::cli::{Cli, Commands, ConfigCommands, InputArgs};
use crate::config::{self, AppConfig};
use crate::customs::ImportInputs;
use crate::error::{ImportCostError, Result};
use crate::marketplace::{FeeSchedule, DEFAULT_FIXED_FEE_THRESHOLD};
use crate::reports::{build_quote, ImportQuote};
use crate::validation::{validate_inputs, ValidationIssue};

/// Route a parsed command line to its handler
pub fn dispatch_command(cli: Cli) -> Result<()> {
    let Cli {
        json,
        config: config_path,
        command,
        ..
    } = cli;

    // Config commands must work even when the file itself is broken
    let load = || {
        config::load_config(config_path.as_deref()).context("failed to load configuration")
    };

    match command {
        Commands::Quote {
            inputs,
            scenario,
            force,
        } => dispatch_quote(&load()?, inputs, scenario, force, json),
        Commands::Margin {
            selling_price,
            unit_cost,
            marketplace,
            fee_percent,
            fixed_fee,
            threshold,
        } => dispatch_margin(
            &load()?,
            MarginRequest {
                selling_price,
                unit_cost,
                marketplace,
                fee_percent,
                fixed_fee,
                threshold,
            },
            json,
        ),
        Commands::Batch { file, scenario } => dispatch_batch(&load()?, &file, scenario, json),
        Commands::Scenarios => dispatch_scenarios(&load()?, json),
        Commands::Marketplaces => dispatch_marketplaces(&load()?, json),
        Commands::Config { action } => dispatch_config(action, config_path.as_deref(), json),
    }
}

/// Config defaults overridden by whatever was given on the command line.
/// Default prices for marketplaces the config no longer defines are dropped.
pub fn resolve_inputs(args: InputArgs, config: &AppConfig) -> ImportInputs {
    let mut inputs = config.defaults.to_inputs();
    inputs
        .selling_prices
        .retain(|id, _| config.marketplace(id).is_some());

    if let Some(quantity) = args.quantity {
        inputs.quantity = quantity;
    }
    if let Some(unit_price) = args.unit_price {
        inputs.unit_price_usd = unit_price;
    }
    if let Some(freight) = args.freight {
        inputs.freight_usd = freight;
    }
    if let Some(exchange_rate) = args.exchange_rate {
        inputs.exchange_rate = exchange_rate;
    }
    if let Some(icms) = args.icms {
        inputs.icms_rate = icms;
    }
    for (marketplace, price) in args.prices {
        inputs.set_selling_price(&marketplace, price);
    }
    inputs
}

#[derive(Serialize)]
struct QuoteOutput<'a> {
    #[serde(flatten)]
    quote: &'a ImportQuote,
    issues: &'a [ValidationIssue],
}

fn dispatch_quote(
    config: &AppConfig,
    args: InputArgs,
    scenario: Option<String>,
    force: bool,
    json_output: bool,
) -> Result<()> {
    let inputs = resolve_inputs(args, config);
    let scenario = scenario.unwrap_or_else(|| config.defaults.active_scenario.clone());
    info!("Quoting {} units, active scenario '{}'", inputs.quantity, scenario);

    let report = validate_inputs(&inputs, config);
    if !report.is_valid() {
        if !json_output {
            eprint!("{}", format_validation_issues(&report.issues));
        }
        if !force {
            return report
                .into_result()
                .context("invalid inputs (use --force to compute anyway)");
        }
        warn!(
            "Computing with {} out-of-range input(s)",
            report.issues.len()
        );
    }

    let quote = build_quote(&inputs, config, &scenario)?;

    if json_output {
        let payload = QuoteOutput {
            quote: &quote,
            issues: &report.issues,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", format_quote_table(&quote));
    }
    Ok(())
}

struct MarginRequest {
    selling_price: Decimal,
    unit_cost: Decimal,
    marketplace: Option<String>,
    fee_percent: Option<Decimal>,
    fixed_fee: Option<Decimal>,
    threshold: Option<Decimal>,
}

fn dispatch_margin(config: &AppConfig, request: MarginRequest, json_output: bool) -> Result<()> {
    let MarginRequest {
        selling_price,
        unit_cost,
        marketplace,
        fee_percent,
        fixed_fee,
        threshold,
    } = request;

    let schedule = match (marketplace, fee_percent, fixed_fee) {
        (Some(id), _, _) => config
            .marketplace(&id)
            .cloned()
            .ok_or(ImportCostError::UnknownMarketplace(id))?,
        (None, Some(fee_percent), Some(fixed_fee)) => {
            FeeSchedule::new("custom", "Custom fees", fee_percent, fixed_fee)
                .with_threshold(threshold.unwrap_or(DEFAULT_FIXED_FEE_THRESHOLD))
        }
        _ => bail!("either --marketplace or both --fee-percent and --fixed-fee are required"),
    };
    let margin = schedule.margin(selling_price, unit_cost);

    if selling_price <= Decimal::ZERO {
        warn!("Selling price {} is not positive", selling_price);
    }

    if json_output {
        let payload = serde_json::json!({
            "marketplace": schedule.id,
            "unit_cost": unit_cost,
            "margin": margin,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", format_margin(&schedule, unit_cost, margin.as_ref()));
    }
    Ok(())
}

fn dispatch_batch(
    config: &AppConfig,
    file: &Path,
    scenario: Option<String>,
    json_output: bool,
) -> Result<()> {
    let scenario = scenario.unwrap_or_else(|| config.defaults.active_scenario.clone());
    info!("Evaluating batch file {} with scenario '{}'", file.display(), scenario);

    let input = parse_batch_csv(file)
        .with_context(|| format!("failed to read batch file {}", file.display()))?;
    let quotes = evaluate_batch(&input, config, &scenario)?;

    if json_output {
        let payload = serde_json::json!({
            "rows": quotes,
            "errors": input.errors,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if quotes.is_empty() && input.errors.is_empty() {
        println!("\n{} No rows found in {}\n", "ℹ".blue().bold(), file.display());
        return Ok(());
    }

    print!("{}", format_batch_table(&quotes, &input.errors, config));
    Ok(())
}

fn dispatch_scenarios(config: &AppConfig, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&config.scenarios)?);
    } else {
        print!(
            "{}",
            format_scenarios_table(&config.scenarios, &config.defaults.active_scenario)
        );
    }
    Ok(())
}

fn dispatch_marketplaces(config: &AppConfig, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&config.marketplaces)?);
    } else {
        print!("{}", format_marketplaces_table(&config.marketplaces));
    }
    Ok(())
}

fn dispatch_config(action: ConfigCommands, explicit: Option<&Path>, json_output: bool) -> Result<()> {
    let location = config::resolve_config_path(explicit)?;

    match action {
        ConfigCommands::Path => {
            if json_output {
                let payload = serde_json::json!({
                    "path": location.path,
                    "exists": location.path.exists(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", location.path.display());
            }
        }
        ConfigCommands::Show => {
            let config = config::load_config(explicit).context("failed to load configuration")?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", config::to_toml(&config)?);
            }
        }
        ConfigCommands::Init { force } => {
            config::write_default_config(&location.path, force)?;
            report_written(&location.path, json_output)?;
        }
    }
    Ok(())
}

fn report_written(path: &Path, json_output: bool) -> Result<()> {
    if json_output {
        let payload = serde_json::json!({ "written": path });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "{} Wrote default config to {}",
            "✓".green().bold(),
            path.display()
        );
    }
    Ok(())
}
