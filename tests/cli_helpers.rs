#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use assert_cmd::cargo;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::str::FromStr;
use tempfile::TempDir;

pub fn config_root_for_home(home: &TempDir) -> PathBuf {
    home.path().join(".config")
}

pub fn config_file_for_home(home: &TempDir) -> PathBuf {
    config_root_for_home(home)
        .join("importcost")
        .join("config.toml")
}

/// Command isolated from the user's real config and environment
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("importcost"));
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", config_root_for_home(home));
    cmd.env_remove("IMPORTCOST_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let output = run_cmd(home, args)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

pub fn quote_json(home: &TempDir, extra: &[&str]) -> Result<Value> {
    let mut args = vec!["--json", "quote"];
    args.extend_from_slice(extra);
    run_cmd_json(home, &args)
}

/// Decimals are serialized as strings
pub fn decimal_from_value(value: &Value) -> Result<Decimal> {
    match value {
        Value::String(s) => Ok(Decimal::from_str(s)?),
        Value::Number(n) => Ok(Decimal::from_str(&n.to_string())?),
        other => Err(anyhow!("expected a decimal, got {}", other)),
    }
}

/// `quote.scenarios[idx].result.<field>`
pub fn scenario_field(quote: &Value, idx: usize, field: &str) -> Result<Decimal> {
    decimal_from_value(&quote["scenarios"][idx]["result"][field])
}

/// Margin entry of the quote for `marketplace_id`
pub fn marketplace_margin<'a>(quote: &'a Value, marketplace_id: &str) -> Result<&'a Value> {
    quote["marketplaces"]
        .as_array()
        .and_then(|entries| {
            entries
                .iter()
                .find(|m| m["marketplace"]["id"] == marketplace_id)
        })
        .map(|m| &m["margin"])
        .ok_or_else(|| anyhow!("marketplace {} missing from quote", marketplace_id))
}
