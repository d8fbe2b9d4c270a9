//! Batch evaluation of many shipments from a CSV file.
//!
//! Expected header (case-insensitive, any column order):
//! `label, quantity, unit_price_usd, freight_usd, exchange_rate, icms_rate,
//! price_<marketplace>...`. `label` and the price columns are optional.
//! Both `,` and `;` delimiters are accepted; with `;` the numbers may use a
//! decimal comma (`5,40`).

use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::customs::ImportInputs;
use crate::error::ImportCostError;
use crate::reports::{build_quote, ImportQuote};
use crate::utils::parse_decimal;
use crate::validation::{validate_inputs, ValidationIssue};

const PRICE_PREFIX: &str = "price_";

/// One parsed input line
#[derive(Debug, Clone)]
pub struct BatchRow {
    /// Line number in the file (header is line 1)
    pub line: usize,
    pub label: Option<String>,
    pub inputs: ImportInputs,
}

/// A line that could not be parsed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    pub rows: Vec<BatchRow>,
    pub errors: Vec<BatchRowError>,
}

/// Quote for one line, with any range issues found in its inputs
#[derive(Debug, Clone, Serialize)]
pub struct BatchQuote {
    pub line: usize,
    pub label: Option<String>,
    pub issues: Vec<ValidationIssue>,
    pub quote: ImportQuote,
}

#[derive(Debug)]
struct ColumnMapping {
    label: Option<usize>,
    quantity: usize,
    unit_price_usd: usize,
    freight_usd: usize,
    exchange_rate: usize,
    icms_rate: usize,
    prices: Vec<(String, usize)>,
}

pub fn parse_batch_csv<P: AsRef<Path>>(path: P) -> Result<BatchInput, ImportCostError> {
    let path = path.as_ref();
    info!("Parsing batch CSV file: {:?}", path);

    let contents = std::fs::read_to_string(path)?;
    let delimiter = detect_delimiter(&contents);
    parse_batch_reader(contents.as_bytes(), delimiter)
}

/// Semicolon when the header uses it and has no commas, comma otherwise
fn detect_delimiter(contents: &str) -> u8 {
    let header = contents.lines().next().unwrap_or_default();
    if header.contains(';') && !header.contains(',') {
        b';'
    } else {
        b','
    }
}

pub fn parse_batch_reader<R: Read>(reader: R, delimiter: u8) -> Result<BatchInput, ImportCostError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ImportCostError::Batch(format!("failed to read CSV headers: {}", e)))?
        .clone();
    let mapping = find_columns(&headers)?;
    debug!("Column mapping: {:?}", mapping);

    let mut input = BatchInput::default();

    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let parsed = record
            .map_err(|e| e.to_string())
            .and_then(|record| parse_row(&record, &mapping));

        match parsed {
            Ok(Some((label, inputs))) => input.rows.push(BatchRow { line, label, inputs }),
            Ok(None) => continue,
            Err(message) => {
                warn!("Skipping line {}: {}", line, message);
                input.errors.push(BatchRowError { line, message });
            }
        }
    }

    info!(
        "Parsed {} batch rows ({} skipped)",
        input.rows.len(),
        input.errors.len()
    );
    Ok(input)
}

fn find_columns(headers: &StringRecord) -> Result<ColumnMapping, ImportCostError> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let require = |name: &str| {
        find(name).ok_or_else(|| ImportCostError::Batch(format!("missing column '{}'", name)))
    };

    let prices = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| {
            let lower = h.trim().to_ascii_lowercase();
            lower
                .strip_prefix(PRICE_PREFIX)
                .filter(|id| !id.is_empty())
                .map(|id| (id.to_string(), idx))
        })
        .collect();

    Ok(ColumnMapping {
        label: find("label"),
        quantity: require("quantity")?,
        unit_price_usd: require("unit_price_usd")?,
        freight_usd: require("freight_usd")?,
        exchange_rate: require("exchange_rate")?,
        icms_rate: require("icms_rate")?,
        prices,
    })
}

/// `Ok(None)` for blank lines
fn parse_row(
    record: &StringRecord,
    mapping: &ColumnMapping,
) -> Result<Option<(Option<String>, ImportInputs)>, String> {
    if record.iter().all(|field| field.trim().is_empty()) {
        return Ok(None);
    }

    let field = |idx: usize, name: &str| -> Result<Decimal, String> {
        let raw = record.get(idx).unwrap_or_default();
        parse_decimal(raw).ok_or_else(|| format!("invalid {} '{}'", name, raw))
    };

    let raw_quantity = record.get(mapping.quantity).unwrap_or_default();
    let quantity = raw_quantity
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity '{}'", raw_quantity))?;

    let mut inputs = ImportInputs::new(
        quantity,
        field(mapping.unit_price_usd, "unit_price_usd")?,
        field(mapping.freight_usd, "freight_usd")?,
        field(mapping.exchange_rate, "exchange_rate")?,
        field(mapping.icms_rate, "icms_rate")?,
    );

    for (marketplace, idx) in &mapping.prices {
        // An empty price cell means "not listed there"
        if record.get(*idx).map_or(true, |v| v.trim().is_empty()) {
            continue;
        }
        let price = field(*idx, &format!("{}{}", PRICE_PREFIX, marketplace))?;
        inputs.set_selling_price(marketplace, price);
    }

    let label = mapping
        .label
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    Ok(Some((label, inputs)))
}

/// Quote every row independently. Rows with out-of-range inputs are still
/// quoted; their issues travel with the result.
pub fn evaluate_batch(
    input: &BatchInput,
    config: &AppConfig,
    active_scenario: &str,
) -> Result<Vec<BatchQuote>, ImportCostError> {
    input
        .rows
        .iter()
        .map(|row| -> Result<BatchQuote, ImportCostError> {
            let report = validate_inputs(&row.inputs, config);
            if !report.is_valid() {
                warn!(
                    "Line {} has invalid input(s): {:?}",
                    row.line,
                    report.issue_summary()
                );
            }
            Ok(BatchQuote {
                line: row.line,
                label: row.label.clone(),
                issues: report.issues,
                quote: build_quote(&row.inputs, config, active_scenario)?,
            })
        })
        .collect()
}
