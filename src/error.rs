//! Error handling for importcost
//!
//! Library-level error types. The calculators themselves never fail; these
//! cover the layers around them (configuration, validation, batch input).
//! The binary uses anyhow for context chaining on top of these.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Core error types for the layers surrounding the calculators
#[derive(Error, Debug)]
pub enum ImportCostError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("validation error: {}", summarize(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("unknown marketplace '{0}'")]
    UnknownMarketplace(String),

    #[error("batch input error: {0}")]
    Batch(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = ImportCostError::Config("missing home directory".to_string());
        assert_eq!(err.to_string(), "config error: missing home directory");

        let err = ImportCostError::UnknownScenario("half".to_string());
        assert_eq!(err.to_string(), "unknown scenario 'half'");
    }

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = ImportCostError::Validation(vec![
            ValidationIssue::new("quantity", "0", "Quantity must be greater than zero"),
            ValidationIssue::new("icms_rate", "100", "ICMS rate must be below 100%"),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("validation error"));
        assert!(msg.contains("quantity: Quantity must be greater than zero"));
        assert!(msg.contains("icms_rate: ICMS rate must be below 100%"));
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(ImportCostError::Batch("row 3".to_string())).context("failed to evaluate batch");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to evaluate batch"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("row 3"));
            }
            Ok(_) => panic!("expected error"),
        }
    }
}
