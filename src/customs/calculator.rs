//! Landed cost of an import shipment under Brazilian customs rules.
//!
//! Import duty (II) is charged on the customs value, which is the *declared*
//! product value plus freight. ICMS is then charged "por dentro": its own
//! amount is part of its base, so it is grossed up from the duty-paid value.
//! The money actually paid to the supplier does not depend on what was
//! declared, so the total cost always uses the real product value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::inputs::ImportInputs;

/// Imposto de Importação, fixed at 60% of the customs value
pub const IMPORT_TAX_RATE: Decimal = Decimal::from_parts(60, 0, 0, false, 2);

/// Cost breakdown for one declaration ratio. All amounts are in BRL and unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Product value as declared on the invoice
    pub declared_product_total: Decimal,
    /// Real product value (always the full price)
    pub product_total: Decimal,
    pub freight_total: Decimal,
    pub customs_value: Decimal,
    pub import_tax: Decimal,
    pub icms: Decimal,
    pub total_taxes: Decimal,
    pub total_import_cost: Decimal,
    pub unit_cost: Decimal,
}

/// Compute the landed cost of `inputs` when `declaration_ratio` of the unit
/// price is declared to customs.
///
/// Never panics. Returns `None` when the result is degenerate: a division by
/// zero (`icms_rate == 100` or `quantity == 0`) or a decimal overflow.
/// Out-of-range inputs that are still computable (negative prices, ICMS above
/// 100%) produce a result with meaningless figures; rejecting them is the
/// caller's job (see [`crate::validation`]).
pub fn compute_customs_cost(
    inputs: &ImportInputs,
    declaration_ratio: Decimal,
) -> Option<CalculationResult> {
    let quantity = Decimal::from(inputs.quantity);

    let declared_unit_price = inputs.unit_price_usd.checked_mul(declaration_ratio)?;
    let declared_product_total = quantity
        .checked_mul(declared_unit_price)?
        .checked_mul(inputs.exchange_rate)?;
    let freight_total = inputs.freight_usd.checked_mul(inputs.exchange_rate)?;

    let customs_value = declared_product_total.checked_add(freight_total)?;
    let import_tax = customs_value.checked_mul(IMPORT_TAX_RATE)?;
    let icms = gross_up_icms(customs_value.checked_add(import_tax)?, inputs.icms_rate)?;
    let total_taxes = import_tax.checked_add(icms)?;

    let product_total = quantity
        .checked_mul(inputs.unit_price_usd)?
        .checked_mul(inputs.exchange_rate)?;
    let total_import_cost = product_total
        .checked_add(freight_total)?
        .checked_add(total_taxes)?;
    let unit_cost = total_import_cost.checked_div(quantity)?;

    trace!(
        %declaration_ratio,
        %customs_value,
        %total_taxes,
        %unit_cost,
        "computed customs cost"
    );

    Some(CalculationResult {
        declared_product_total,
        product_total,
        freight_total,
        customs_value,
        import_tax,
        icms,
        total_taxes,
        total_import_cost,
        unit_cost,
    })
}

/// ICMS due on `base` (the value before ICMS) at `icms_rate` percent.
///
/// `base * r / (1 - r)` with `r = icms_rate / 100`. The product is taken
/// before the division so exact decimal inputs stay exact.
pub fn gross_up_icms(base: Decimal, icms_rate: Decimal) -> Option<Decimal> {
    let rate = icms_rate.checked_div(Decimal::ONE_HUNDRED)?;
    let remainder = Decimal::ONE.checked_sub(rate)?;
    base.checked_mul(rate)?.checked_div(remainder)
}
