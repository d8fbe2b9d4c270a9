//! Configuration
//!
//! Declaration scenarios, marketplace fee schedules and the default inputs
//! of a quote. Everything has a built-in default; a TOML file only needs the
//! sections it wants to override.
//!
//! Lookup order: explicit path (`--config`), then `IMPORTCOST_CONFIG`, then
//! `<config home>/importcost/config.toml`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::customs::{DeclarationScenario, ImportInputs, ScenarioSet, MERCADO_LIVRE, SHOPEE};
use crate::error::ImportCostError;
use crate::marketplace::{builtin_schedules, FeeSchedule};

/// Environment variable holding an explicit config file path
pub const CONFIG_ENV: &str = "IMPORTCOST_CONFIG";

const APP_DIR: &str = "importcost";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: InputDefaults,
    pub scenarios: ScenarioSet,
    pub marketplaces: Vec<FeeSchedule>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: InputDefaults::default(),
            scenarios: ScenarioSet::default(),
            marketplaces: builtin_schedules(),
        }
    }
}

impl AppConfig {
    pub fn scenario(&self, id: &str) -> Option<&DeclarationScenario> {
        self.scenarios.get(id)
    }

    pub fn marketplace(&self, id: &str) -> Option<&FeeSchedule> {
        self.marketplaces
            .iter()
            .find(|m| m.id.eq_ignore_ascii_case(id))
    }

    /// Structural checks that TOML parsing alone cannot express
    pub fn validate(&self) -> Result<(), ImportCostError> {
        if self.scenarios.is_empty() {
            return Err(ImportCostError::Config(
                "at least one declaration scenario is required".to_string(),
            ));
        }
        if let Some(id) = self.scenarios.duplicate_id() {
            return Err(ImportCostError::Config(format!(
                "duplicate scenario id '{}'",
                id
            )));
        }
        for (idx, m) in self.marketplaces.iter().enumerate() {
            if self.marketplaces[..idx]
                .iter()
                .any(|earlier| earlier.id.eq_ignore_ascii_case(&m.id))
            {
                return Err(ImportCostError::Config(format!(
                    "duplicate marketplace id '{}'",
                    m.id
                )));
            }
        }
        if self.scenario(&self.defaults.active_scenario).is_none() {
            return Err(ImportCostError::Config(format!(
                "default active scenario '{}' is not defined (available: {})",
                self.defaults.active_scenario,
                self.scenarios.ids().join(", ")
            )));
        }
        Ok(())
    }
}

/// Inputs used when the command line does not provide them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDefaults {
    pub quantity: u32,
    pub unit_price_usd: Decimal,
    pub freight_usd: Decimal,
    pub exchange_rate: Decimal,
    pub icms_rate: Decimal,
    pub active_scenario: String,
    pub selling_prices: BTreeMap<String, Decimal>,
}

impl Default for InputDefaults {
    fn default() -> Self {
        let mut selling_prices = BTreeMap::new();
        selling_prices.insert(SHOPEE.to_string(), Decimal::from(150));
        selling_prices.insert(MERCADO_LIVRE.to_string(), Decimal::from(160));

        Self {
            quantity: 100,
            unit_price_usd: Decimal::from(10),
            freight_usd: Decimal::from(50),
            exchange_rate: Decimal::from_parts(540, 0, 0, false, 2),
            // São Paulo
            icms_rate: Decimal::from(19),
            active_scenario: "full".to_string(),
            selling_prices,
        }
    }
}

impl InputDefaults {
    pub fn to_inputs(&self) -> ImportInputs {
        let mut inputs = ImportInputs::new(
            self.quantity,
            self.unit_price_usd,
            self.freight_usd,
            self.exchange_rate,
            self.icms_rate,
        );
        for (marketplace, price) in &self.selling_prices {
            inputs.set_selling_price(marketplace, *price);
        }
        inputs
    }
}

/// Where the config file is (or would be), and whether the user asked for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub explicit: bool,
}

/// Resolve the config file location without touching the filesystem
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<ConfigLocation, ImportCostError> {
    if let Some(path) = explicit {
        return Ok(ConfigLocation {
            path: path.to_path_buf(),
            explicit: true,
        });
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(ConfigLocation {
            path: PathBuf::from(path),
            explicit: true,
        });
    }

    let config_home = dir_spec::config_home().ok_or_else(|| {
        ImportCostError::Config("could not determine config directory".to_string())
    })?;

    Ok(ConfigLocation {
        path: config_home.join(APP_DIR).join(CONFIG_FILE),
        explicit: false,
    })
}

/// Load the effective configuration.
///
/// A missing file at the default location means built-in defaults; a missing
/// file the user pointed at explicitly is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ImportCostError> {
    let location = resolve_config_path(explicit)?;

    if !location.path.exists() {
        if location.explicit {
            return Err(ImportCostError::Config(format!(
                "config file not found: {}",
                location.path.display()
            )));
        }
        debug!(
            "No config file at {}, using built-in defaults",
            location.path.display()
        );
        return Ok(AppConfig::default());
    }

    load_from_path(&location.path)
}

pub fn load_from_path(path: &Path) -> Result<AppConfig, ImportCostError> {
    info!("Loading config from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents).map_err(|e| match e {
        ParseFailure::Toml(source) => ImportCostError::ConfigParse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Invalid(err) => err,
    })?;
    Ok(config)
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ImportCostError),
}

fn parse_config(contents: &str) -> Result<AppConfig, ParseFailure> {
    let config: AppConfig = toml::from_str(contents).map_err(ParseFailure::Toml)?;
    config.validate().map_err(ParseFailure::Invalid)?;
    Ok(config)
}

pub fn to_toml(config: &AppConfig) -> Result<String, ImportCostError> {
    toml::to_string_pretty(config)
        .map_err(|e| ImportCostError::Config(format!("failed to serialize config: {}", e)))
}

/// Write the built-in defaults to `path`, creating parent directories.
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<(), ImportCostError> {
    if path.exists() && !force {
        return Err(ImportCostError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = to_toml(&AppConfig::default())?;
    std::fs::write(path, contents)?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}
