//! Importcost - Brazilian import landed-cost and marketplace margin calculator
//!
//! This library computes what an imported product really costs once
//! Imposto de Importação and ICMS are paid, under different invoice
//! declaration scenarios, and what is left per unit after marketplace fees.

pub mod batch;
pub mod cli;
pub mod config;
pub mod customs;
pub mod dispatcher;
pub mod error;
pub mod marketplace;
pub mod reports;
pub mod utils;
pub mod validation;
