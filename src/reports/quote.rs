use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::customs::{CalculationResult, DeclarationScenario, ImportInputs};
use crate::error::ImportCostError;
use crate::marketplace::{FeeSchedule, MarketplaceMargin};

/// Cost breakdown under one declaration scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioCost {
    pub scenario: DeclarationScenario,
    /// `None` when the calculation is degenerate
    pub result: Option<CalculationResult>,
}

/// Margin on one marketplace at the active scenario's unit cost
#[derive(Debug, Clone, Serialize)]
pub struct MarketplaceQuote {
    pub marketplace: FeeSchedule,
    pub margin: Option<MarketplaceMargin>,
}

/// Everything shown for one set of inputs: every scenario side by side, and
/// the marketplace margins for the scenario the operator picked.
#[derive(Debug, Clone, Serialize)]
pub struct ImportQuote {
    pub inputs: ImportInputs,
    pub active_scenario: String,
    pub scenarios: Vec<ScenarioCost>,
    pub marketplaces: Vec<MarketplaceQuote>,
}

impl ImportQuote {
    pub fn active(&self) -> Option<&ScenarioCost> {
        self.scenarios
            .iter()
            .find(|s| s.scenario.id == self.active_scenario)
    }

    pub fn active_unit_cost(&self) -> Option<Decimal> {
        self.active()
            .and_then(|s| s.result.as_ref())
            .map(|r| r.unit_cost)
    }
}

/// Build a quote for `inputs` with `active_scenario` driving the margins.
///
/// Marketplaces without a selling price in `inputs` are left out.
pub fn build_quote(
    inputs: &ImportInputs,
    config: &AppConfig,
    active_scenario: &str,
) -> Result<ImportQuote, ImportCostError> {
    let active = config
        .scenario(active_scenario)
        .ok_or_else(|| ImportCostError::UnknownScenario(active_scenario.to_string()))?;

    let scenarios: Vec<ScenarioCost> = config
        .scenarios
        .compute_all(inputs)
        .into_iter()
        .map(|(scenario, result)| ScenarioCost {
            scenario: scenario.clone(),
            result,
        })
        .collect();

    let unit_cost = scenarios
        .iter()
        .find(|s| s.scenario.id == active.id)
        .and_then(|s| s.result.as_ref())
        .map(|r| r.unit_cost);

    let marketplaces = config
        .marketplaces
        .iter()
        .filter_map(|schedule| {
            let price = inputs.selling_price(&schedule.id)?;
            Some(MarketplaceQuote {
                marketplace: schedule.clone(),
                margin: unit_cost.and_then(|cost| schedule.margin(price, cost)),
            })
        })
        .collect::<Vec<_>>();

    debug!(
        "Built quote: {} scenarios, {} marketplaces, active '{}'",
        scenarios.len(),
        marketplaces.len(),
        active.id
    );

    Ok(ImportQuote {
        inputs: inputs.clone(),
        active_scenario: active.id.clone(),
        scenarios,
        marketplaces,
    })
}
