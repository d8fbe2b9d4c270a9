//! Integration tests for the landed-cost and margin calculators
//!
//! These tests check properties that must hold for any valid input:
//! - The real product value does not depend on the declaration
//! - Declared value and import tax scale with the declaration ratio
//! - ICMS is non-negative and strictly increasing in its rate
//! - Unit cost times quantity gives back the total
//! - Profit plus fees plus cost gives back the selling price
//! - The flat fee threshold is strict

use importcost::config::AppConfig;
use importcost::customs::{
    compute_customs_cost, CalculationResult, DeclarationScenario, ImportInputs, IMPORT_TAX_RATE,
};
use importcost::marketplace::{compute_margin, FeeSchedule};
use importcost::reports::build_quote;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TOLERANCE: Decimal = dec!(0.000001);

fn sample_inputs() -> ImportInputs {
    ImportInputs::new(100, dec!(10.0), dec!(50.0), dec!(5.40), dec!(19))
}

fn input_grid() -> Vec<ImportInputs> {
    let mut grid = Vec::new();
    for quantity in [1u32, 7, 100, 2500] {
        for unit_price in [dec!(0.35), dec!(10), dec!(129.99)] {
            for icms in [dec!(0), dec!(4), dec!(12), dec!(19), dec!(25)] {
                grid.push(ImportInputs::new(
                    quantity,
                    unit_price,
                    dec!(42.5),
                    dec!(5.137),
                    icms,
                ));
            }
        }
    }
    grid
}

fn compute(inputs: &ImportInputs, ratio: Decimal) -> CalculationResult {
    compute_customs_cost(inputs, ratio).expect("valid inputs must produce a result")
}

#[test]
fn test_real_product_value_ignores_declaration() {
    for inputs in input_grid() {
        let full = compute(&inputs, dec!(1));
        let reduced = compute(&inputs, dec!(0.3));
        let nothing = compute(&inputs, dec!(0));

        assert_eq!(full.product_total, reduced.product_total);
        assert_eq!(full.product_total, nothing.product_total);
        assert_eq!(full.freight_total, reduced.freight_total);
    }
}

#[test]
fn test_declared_value_is_linear_in_ratio() {
    for inputs in input_grid() {
        let full = compute(&inputs, dec!(1));
        for ratio in [dec!(0), dec!(0.3), dec!(0.5), dec!(1)] {
            let result = compute(&inputs, ratio);
            assert_eq!(
                result.declared_product_total,
                full.declared_product_total * ratio
            );
            assert_eq!(result.customs_value, result.declared_product_total + result.freight_total);
        }
    }
}

#[test]
fn test_import_tax_is_sixty_percent_of_customs_value() {
    for inputs in input_grid() {
        let result = compute(&inputs, dec!(0.3));
        assert_eq!(result.import_tax, result.customs_value * IMPORT_TAX_RATE);
        assert_eq!(result.total_taxes, result.import_tax + result.icms);
    }
}

#[test]
fn test_icms_is_strictly_increasing_in_rate() {
    for base_inputs in input_grid() {
        let mut previous: Option<Decimal> = None;
        for tenths in (0..1000).step_by(25) {
            let mut inputs = base_inputs.clone();
            inputs.icms_rate = Decimal::new(tenths, 1);
            let icms = compute(&inputs, dec!(1)).icms;

            assert!(icms >= Decimal::ZERO, "negative ICMS {} at {}%", icms, inputs.icms_rate);
            if let Some(previous) = previous {
                assert!(
                    icms > previous,
                    "ICMS at {}% ({}) is not above the previous rate ({})",
                    inputs.icms_rate,
                    icms,
                    previous
                );
            }
            previous = Some(icms);
        }
    }
}

#[test]
fn test_icms_is_never_negative() {
    for inputs in input_grid() {
        for ratio in [dec!(0), dec!(0.3), dec!(1)] {
            let result = compute(&inputs, ratio);
            assert!(result.icms >= Decimal::ZERO);
            assert!(result.total_taxes >= result.import_tax);
        }
    }
}

#[test]
fn test_zero_icms_means_no_icms() {
    let mut inputs = sample_inputs();
    inputs.icms_rate = Decimal::ZERO;
    assert_eq!(compute(&inputs, dec!(1)).icms, Decimal::ZERO);
}

#[test]
fn test_unit_cost_times_quantity_is_total() {
    for inputs in input_grid() {
        for ratio in [dec!(1), dec!(0.3)] {
            let result = compute(&inputs, ratio);
            let rebuilt = result.unit_cost * Decimal::from(inputs.quantity);
            assert!(
                (rebuilt - result.total_import_cost).abs() < TOLERANCE,
                "{} * {} != {}",
                result.unit_cost,
                inputs.quantity,
                result.total_import_cost
            );
        }
    }
}

#[test]
fn test_reduced_declaration_never_costs_more() {
    for inputs in input_grid() {
        let full = compute(&inputs, dec!(1));
        let reduced = compute(&inputs, dec!(0.3));
        assert!(reduced.total_import_cost <= full.total_import_cost);
    }
}

#[test]
fn test_degenerate_inputs_yield_no_result() {
    let mut inputs = sample_inputs();
    inputs.icms_rate = dec!(100);
    assert!(compute_customs_cost(&inputs, dec!(1)).is_none());

    let mut inputs = sample_inputs();
    inputs.quantity = 0;
    assert!(compute_customs_cost(&inputs, dec!(1)).is_none());
}

#[test]
fn test_margin_identity() {
    for price in [dec!(19.90), dec!(78.99), dec!(79), dec!(150), dec!(1999)] {
        for schedule in [FeeSchedule::shopee(), FeeSchedule::mercado_livre()] {
            let unit_cost = dec!(42.17);
            let margin = schedule.margin(price, unit_cost).unwrap();

            assert_eq!(margin.profit + margin.total_fee + unit_cost, price);
            assert_eq!(margin.margin_percent, margin.profit / price * dec!(100));
        }
    }
}

#[test]
fn test_fixed_fee_threshold_is_strict() {
    let at = compute_margin(dec!(79), dec!(40), dec!(0.20), dec!(3)).unwrap();
    assert_eq!(at.total_fee, dec!(15.80));

    let below = compute_margin(dec!(78.99), dec!(40), dec!(0.20), dec!(3)).unwrap();
    assert_eq!(below.total_fee, dec!(78.99) * dec!(0.20) + dec!(3));
}

#[test]
fn test_zero_price_has_no_margin() {
    assert!(compute_margin(Decimal::ZERO, dec!(40), dec!(0.20), dec!(3)).is_none());
}

#[test]
fn test_default_screen_end_to_end() {
    let config = AppConfig::default();
    let inputs = config.defaults.to_inputs();

    let full = build_quote(&inputs, &config, "full").unwrap();
    assert_eq!(full.active_unit_cost(), Some(dec!(112)));

    let shopee = full.marketplaces[0].margin.as_ref().unwrap();
    assert_eq!(shopee.total_fee, dec!(30));
    assert_eq!(shopee.profit, dec!(8));
    assert_eq!(shopee.margin_percent.round_dp(2), dec!(5.33));

    let ml = full.marketplaces[1].margin.as_ref().unwrap();
    assert_eq!(ml.total_fee, dec!(27.20));
    assert_eq!(ml.profit, dec!(20.80));
    assert_eq!(ml.margin_percent, dec!(13));

    let reduced = build_quote(&inputs, &config, "reduced").unwrap();
    let unit_cost = reduced.active_unit_cost().unwrap();
    assert_eq!(unit_cost.round_dp(2), dec!(75.13));

    // Both quotes carry both scenarios; only the margins follow the active one
    assert_eq!(full.scenarios.len(), 2);
    assert_eq!(
        full.scenarios[1].result.as_ref().map(|r| r.total_import_cost),
        reduced.scenarios[1].result.as_ref().map(|r| r.total_import_cost)
    );
}

#[test]
fn test_custom_scenario_matches_direct_computation() {
    let half = DeclarationScenario::new("half", "Invoice 50%", dec!(0.5));
    let inputs = sample_inputs();
    assert_eq!(half.compute(&inputs), compute_customs_cost(&inputs, dec!(0.5)));
}
