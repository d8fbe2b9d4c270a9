//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::batch::{BatchQuote, BatchRowError};
use crate::config::AppConfig;
use crate::customs::{CalculationResult, ScenarioSet, IMPORT_TAX_RATE};
use crate::marketplace::{FeeSchedule, MarketplaceMargin};
use crate::reports::ImportQuote;
use crate::utils::{
    format_currency, format_fraction_as_percent, format_number_br, format_optional_currency,
    format_percent, CurrencySymbol, NOT_AVAILABLE,
};
use crate::validation::ValidationIssue;

type Extractor = fn(&CalculationResult) -> Decimal;

fn colored_money(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format_currency(value).green().to_string()
    } else {
        format_currency(value).red().to_string()
    }
}

fn colored_percent(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format_percent(value).green().to_string()
    } else {
        format_percent(value).red().to_string()
    }
}

/// Format a quote as the scenario comparison table plus the margin table
pub fn format_quote_table(quote: &ImportQuote) -> String {
    let inputs = &quote.inputs;
    let mut output = String::new();

    output.push_str(&format!("\n{} Import Quote\n", "📦".cyan().bold()));
    output.push_str(&format!(
        "  {} units x {} | Freight {} | Exchange rate {} | ICMS {}\n\n",
        inputs.quantity,
        format_number_br(inputs.unit_price_usd, 2, CurrencySymbol::USD),
        format_number_br(inputs.freight_usd, 2, CurrencySymbol::USD),
        format_number_br(inputs.exchange_rate, 2, CurrencySymbol::None),
        format_fraction_as_percent(inputs.icms_rate / Decimal::ONE_HUNDRED),
    ));

    let rows: [(String, Extractor); 9] = [
        ("Declared products".to_string(), |r| r.declared_product_total),
        ("Real products".to_string(), |r| r.product_total),
        ("Freight".to_string(), |r| r.freight_total),
        ("Customs value".to_string(), |r| r.customs_value),
        (
            format!("Import tax ({})", format_fraction_as_percent(IMPORT_TAX_RATE)),
            |r| r.import_tax,
        ),
        (
            format!(
                "ICMS ({})",
                format_fraction_as_percent(inputs.icms_rate / Decimal::ONE_HUNDRED)
            ),
            |r| r.icms,
        ),
        ("Total taxes".to_string(), |r| r.total_taxes),
        ("Total import cost".to_string(), |r| r.total_import_cost),
        ("Unit cost".to_string(), |r| r.unit_cost),
    ];

    let mut builder = Builder::default();
    let mut header = vec!["Description".to_string()];
    header.extend(quote.scenarios.iter().map(|s| {
        if s.scenario.id == quote.active_scenario {
            format!("{} *", s.scenario.label).bold().to_string()
        } else {
            s.scenario.label.clone()
        }
    }));
    builder.push_record(header);

    for (label, extract) in &rows {
        let mut record = vec![label.clone()];
        record.extend(
            quote
                .scenarios
                .iter()
                .map(|s| format_optional_currency(s.result.as_ref().map(*extract))),
        );
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());

    if let Some(active) = quote.active() {
        output.push_str(&format!(
            "\n\n{:<20} {} ({})\n",
            "Active scenario:".bold(),
            active.scenario.label,
            format_optional_currency(quote.active_unit_cost())
        ));
    }

    if !quote.marketplaces.is_empty() {
        output.push('\n');
        output.push_str(&format_margin_table(quote));
    }

    output
}

fn format_margin_table(quote: &ImportQuote) -> String {
    #[derive(Tabled)]
    struct MarginRow {
        #[tabled(rename = "Marketplace")]
        name: String,
        #[tabled(rename = "Selling Price")]
        selling_price: String,
        #[tabled(rename = "Fees")]
        fees: String,
        #[tabled(rename = "Unit Cost")]
        unit_cost: String,
        #[tabled(rename = "Profit")]
        profit: String,
        #[tabled(rename = "Margin")]
        margin: String,
    }

    let unit_cost = format_optional_currency(quote.active_unit_cost());

    let rows: Vec<MarginRow> = quote
        .marketplaces
        .iter()
        .map(|m| {
            let selling_price = quote.inputs.selling_price(&m.marketplace.id);
            match &m.margin {
                Some(margin) => MarginRow {
                    name: m.marketplace.name.clone(),
                    selling_price: format_currency(margin.selling_price),
                    fees: format_currency(margin.total_fee),
                    unit_cost: unit_cost.clone(),
                    profit: colored_money(margin.profit),
                    margin: colored_percent(margin.margin_percent),
                },
                None => MarginRow {
                    name: m.marketplace.name.clone(),
                    selling_price: format_optional_currency(selling_price),
                    fees: NOT_AVAILABLE.to_string(),
                    unit_cost: unit_cost.clone(),
                    profit: NOT_AVAILABLE.to_string(),
                    margin: NOT_AVAILABLE.to_string(),
                },
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    format!("{}\n", table)
}

/// Format a single margin calculation
pub fn format_margin(
    schedule: &FeeSchedule,
    unit_cost: Decimal,
    margin: Option<&MarketplaceMargin>,
) -> String {
    let mut output = format!("\n{} Margin - {}\n\n", "🛒".cyan().bold(), schedule.name);

    let Some(margin) = margin else {
        output.push_str(&format!(
            "{} Margin is undefined for this selling price\n",
            "⚠".yellow().bold()
        ));
        return output;
    };

    output.push_str(&format!(
        "{:<16} {}\n",
        "Selling price:".bold(),
        format_currency(margin.selling_price)
    ));
    let fee_detail = if schedule.applies_fixed_fee(margin.selling_price) {
        format!(
            "{} + fixed {}",
            format_fraction_as_percent(margin.fee_percent),
            format_currency(margin.fixed_fee)
        )
    } else {
        format_fraction_as_percent(margin.fee_percent)
    };
    output.push_str(&format!(
        "{:<16} {} ({})\n",
        "Fees:".bold(),
        format_currency(margin.total_fee),
        fee_detail
    ));
    output.push_str(&format!("{:<16} {}\n", "Unit cost:".bold(), format_currency(unit_cost)));
    output.push_str(&format!("{:<16} {}\n", "Profit:".bold(), colored_money(margin.profit)));
    output.push_str(&format!(
        "{:<16} {}\n",
        "Margin:".bold(),
        colored_percent(margin.margin_percent)
    ));
    output
}

pub fn format_scenarios_table(scenarios: &ScenarioSet, active: &str) -> String {
    #[derive(Tabled)]
    struct ScenarioRow {
        #[tabled(rename = "Id")]
        id: String,
        #[tabled(rename = "Label")]
        label: String,
        #[tabled(rename = "Declared")]
        declared: String,
        #[tabled(rename = "Default")]
        default: String,
    }

    let rows: Vec<ScenarioRow> = scenarios
        .iter()
        .map(|s| ScenarioRow {
            id: s.id.clone(),
            label: s.label.clone(),
            declared: format_fraction_as_percent(s.ratio),
            default: if s.id.eq_ignore_ascii_case(active) {
                "*".to_string()
            } else {
                String::new()
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    format!("{}\n", table)
}

pub fn format_marketplaces_table(marketplaces: &[FeeSchedule]) -> String {
    #[derive(Tabled)]
    struct MarketplaceRow {
        #[tabled(rename = "Id")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Commission")]
        commission: String,
        #[tabled(rename = "Fixed Fee")]
        fixed_fee: String,
        #[tabled(rename = "Fixed Fee Below")]
        threshold: String,
    }

    let rows: Vec<MarketplaceRow> = marketplaces
        .iter()
        .map(|m| MarketplaceRow {
            id: m.id.clone(),
            name: m.name.clone(),
            commission: format_fraction_as_percent(m.fee_percent),
            fixed_fee: format_currency(m.fixed_fee),
            threshold: format_currency(m.fixed_fee_threshold),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());
    format!("{}\n", table)
}

/// One line per batch row: unit cost under each scenario and the margin on
/// each marketplace at the active scenario.
pub fn format_batch_table(
    quotes: &[BatchQuote],
    errors: &[BatchRowError],
    config: &AppConfig,
) -> String {
    let mut output = format!("\n{} Batch Quote\n\n", "📦".cyan().bold());

    let mut builder = Builder::default();
    let mut header = vec!["Line".to_string(), "Label".to_string(), "Qty".to_string()];
    header.extend(config.scenarios.iter().map(|s| s.label.clone()));
    header.extend(config.marketplaces.iter().map(|m| m.name.clone()));
    header.push("Issues".to_string());
    builder.push_record(header);

    for bq in quotes {
        let mut record = vec![
            bq.line.to_string(),
            bq.label.clone().unwrap_or_default(),
            bq.quote.inputs.quantity.to_string(),
        ];
        record.extend(config.scenarios.iter().map(|scenario| {
            let unit_cost = bq
                .quote
                .scenarios
                .iter()
                .find(|s| s.scenario.id == scenario.id)
                .and_then(|s| s.result.as_ref())
                .map(|r| r.unit_cost);
            format_optional_currency(unit_cost)
        }));
        record.extend(config.marketplaces.iter().map(|schedule| {
            match bq
                .quote
                .marketplaces
                .iter()
                .find(|m| m.marketplace.id == schedule.id)
            {
                Some(m) => m
                    .margin
                    .as_ref()
                    .map(|margin| colored_percent(margin.margin_percent))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                None => "-".to_string(),
            }
        }));
        record.push(
            bq.issues
                .iter()
                .map(|i| i.field.clone())
                .collect::<Vec<_>>()
                .join(", "),
        );
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');

    if !errors.is_empty() {
        output.push_str(&format!(
            "\n{} {} line(s) skipped:\n",
            "⚠".yellow().bold(),
            errors.len()
        ));
        for err in errors {
            output.push_str(&format!("  line {}: {}\n", err.line, err.message));
        }
    }

    output
}

pub fn format_validation_issues(issues: &[ValidationIssue]) -> String {
    let mut output = String::new();
    for issue in issues {
        output.push_str(&format!(
            "{} {} = {}: {}\n",
            "⚠".yellow().bold(),
            issue.field.bold(),
            issue.value,
            issue.reason
        ));
        if let Some(suggestion) = &issue.suggestion {
            output.push_str(&format!("    {}\n", suggestion.bright_black()));
        }
    }
    output
}
