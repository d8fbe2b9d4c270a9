//! Input validation
//!
//! The calculators accept any numbers and never fail, so range checks live
//! here, on the input-collection side. Validation collects every issue
//! instead of stopping at the first one, so the operator can fix them all at
//! once.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::customs::ImportInputs;
use crate::error::ImportCostError;

/// A single out-of-range input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Field name that has the issue (e.g., "quantity", "icms_rate", "price.shopee")
    pub field: String,
    /// The problematic value
    pub value: String,
    /// Description of why this is an issue
    pub reason: String,
    /// Suggestion for fixing the issue (if available)
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// All issues found for one set of inputs
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Count issues by field for summary reporting
    pub fn issue_summary(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for issue in &self.issues {
            *summary.entry(issue.field.clone()).or_insert(0) += 1;
        }
        summary
    }

    pub fn into_result(self) -> Result<(), ImportCostError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ImportCostError::Validation(self.issues))
        }
    }
}

/// Check `inputs` against the preconditions of the calculators and the
/// marketplaces known to `config`.
pub fn validate_inputs(inputs: &ImportInputs, config: &AppConfig) -> ValidationReport {
    let mut issues = Vec::new();

    if inputs.quantity == 0 {
        issues.push(ValidationIssue::new(
            "quantity",
            "0",
            "Quantity must be greater than zero",
        ));
    }

    if inputs.unit_price_usd <= Decimal::ZERO {
        issues.push(ValidationIssue::new(
            "unit_price_usd",
            inputs.unit_price_usd.to_string(),
            "Unit price must be greater than zero",
        ));
    }

    if inputs.freight_usd < Decimal::ZERO {
        issues.push(ValidationIssue::new(
            "freight_usd",
            inputs.freight_usd.to_string(),
            "Freight cannot be negative",
        ));
    }

    if inputs.exchange_rate <= Decimal::ZERO {
        issues.push(ValidationIssue::new(
            "exchange_rate",
            inputs.exchange_rate.to_string(),
            "Exchange rate must be greater than zero",
        ));
    }

    if inputs.icms_rate < Decimal::ZERO || inputs.icms_rate >= Decimal::ONE_HUNDRED {
        issues.push(
            ValidationIssue::new(
                "icms_rate",
                inputs.icms_rate.to_string(),
                "ICMS rate must be at least 0% and below 100%",
            )
            .with_suggestion("Use the percentage itself, e.g. 18 for 18%"),
        );
    }

    for (marketplace, price) in &inputs.selling_prices {
        let field = format!("price.{}", marketplace);
        if config.marketplace(marketplace).is_none() {
            let known: Vec<&str> = config.marketplaces.iter().map(|m| m.id.as_str()).collect();
            issues.push(
                ValidationIssue::new(field, price.to_string(), "Unknown marketplace")
                    .with_suggestion(format!("Known marketplaces: {}", known.join(", "))),
            );
            continue;
        }
        if *price <= Decimal::ZERO {
            issues.push(ValidationIssue::new(
                field,
                price.to_string(),
                "Selling price must be greater than zero",
            ));
        }
    }

    ValidationReport { issues }
}
