use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Price below which marketplaces add their flat fee per sale
pub const DEFAULT_FIXED_FEE_THRESHOLD: Decimal = Decimal::from_parts(79, 0, 0, false, 0);

/// Profit of selling one unit on a marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceMargin {
    pub selling_price: Decimal,
    /// Commission as a fraction (0.20 means 20%)
    pub fee_percent: Decimal,
    /// Flat fee of the schedule, whether or not it applied to this price
    pub fixed_fee: Decimal,
    /// Commission plus the flat fee when it applied
    pub total_fee: Decimal,
    pub profit: Decimal,
    pub margin_percent: Decimal,
}

/// Margin with the usual R$ 79 threshold for the flat fee.
///
/// Returns `None` when the margin is undefined (`selling_price == 0`) or
/// the arithmetic overflows.
pub fn compute_margin(
    selling_price: Decimal,
    unit_cost: Decimal,
    fee_percent: Decimal,
    fixed_fee: Decimal,
) -> Option<MarketplaceMargin> {
    compute_margin_with_threshold(
        selling_price,
        unit_cost,
        fee_percent,
        fixed_fee,
        DEFAULT_FIXED_FEE_THRESHOLD,
    )
}

/// Margin where `fixed_fee` is charged only when `selling_price` is strictly
/// below `threshold`.
pub fn compute_margin_with_threshold(
    selling_price: Decimal,
    unit_cost: Decimal,
    fee_percent: Decimal,
    fixed_fee: Decimal,
    threshold: Decimal,
) -> Option<MarketplaceMargin> {
    let applied_fixed_fee = if selling_price < threshold {
        fixed_fee
    } else {
        Decimal::ZERO
    };

    let total_fee = selling_price
        .checked_mul(fee_percent)?
        .checked_add(applied_fixed_fee)?;
    let profit = selling_price.checked_sub(total_fee)?.checked_sub(unit_cost)?;
    let margin_percent = profit
        .checked_div(selling_price)?
        .checked_mul(Decimal::ONE_HUNDRED)?;

    trace!(%selling_price, %total_fee, %profit, "computed marketplace margin");

    Some(MarketplaceMargin {
        selling_price,
        fee_percent,
        fixed_fee,
        total_fee,
        profit,
        margin_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_margin_above_threshold() {
        let margin = compute_margin(dec!(150), dec!(112.01), dec!(0.20), dec!(3.0)).unwrap();

        assert_eq!(margin.total_fee, dec!(30));
        assert_eq!(margin.profit, dec!(7.99));
        assert_eq!(margin.margin_percent.round_dp(2), dec!(5.33));
        assert_eq!(margin.fixed_fee, dec!(3.0));
    }

    #[test]
    fn test_fixed_fee_threshold_is_strict() {
        let at = compute_margin(dec!(79), dec!(0), dec!(0.20), dec!(3)).unwrap();
        assert_eq!(at.total_fee, dec!(15.80));

        let below = compute_margin(dec!(78.99), dec!(0), dec!(0.20), dec!(3)).unwrap();
        assert_eq!(below.total_fee, dec!(15.798) + dec!(3));
    }

    #[test]
    fn test_custom_threshold() {
        let margin =
            compute_margin_with_threshold(dec!(90), dec!(40), dec!(0.17), dec!(6), dec!(100))
                .unwrap();
        assert_eq!(margin.total_fee, dec!(21.30));
        assert_eq!(margin.profit, dec!(28.70));
    }

    #[test]
    fn test_loss_gives_negative_margin() {
        let margin = compute_margin(dec!(50), dec!(60), dec!(0.20), dec!(3)).unwrap();
        assert_eq!(margin.profit, dec!(-23));
        assert_eq!(margin.margin_percent, dec!(-46));
    }

    #[test]
    fn test_zero_selling_price_is_degenerate() {
        assert!(compute_margin(dec!(0), dec!(10), dec!(0.20), dec!(3)).is_none());
    }
}
