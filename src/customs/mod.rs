// Customs module - landed cost of an import under Brazilian rules (II + ICMS)

pub mod calculator;
pub mod inputs;
pub mod scenario;

pub use calculator::{compute_customs_cost, gross_up_icms, CalculationResult, IMPORT_TAX_RATE};
pub use inputs::{ImportInputs, MERCADO_LIVRE, SHOPEE};
pub use scenario::{DeclarationScenario, ScenarioSet};
