use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::margin::{compute_margin_with_threshold, MarketplaceMargin, DEFAULT_FIXED_FEE_THRESHOLD};
use crate::customs::{MERCADO_LIVRE, SHOPEE};

/// Fee policy of one marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub id: String,
    pub name: String,
    /// Commission as a fraction of the selling price
    pub fee_percent: Decimal,
    pub fixed_fee: Decimal,
    #[serde(default = "default_threshold")]
    pub fixed_fee_threshold: Decimal,
}

fn default_threshold() -> Decimal {
    DEFAULT_FIXED_FEE_THRESHOLD
}

impl FeeSchedule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        fee_percent: Decimal,
        fixed_fee: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fee_percent,
            fixed_fee,
            fixed_fee_threshold: DEFAULT_FIXED_FEE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: Decimal) -> Self {
        self.fixed_fee_threshold = threshold;
        self
    }

    /// Shopee: 20% commission plus R$ 3,00 below the threshold
    pub fn shopee() -> Self {
        Self::new(
            SHOPEE,
            "Shopee",
            Decimal::from_parts(20, 0, 0, false, 2),
            Decimal::from(3),
        )
    }

    /// Mercado Livre: 17% commission plus R$ 6,00 below the threshold
    pub fn mercado_livre() -> Self {
        Self::new(
            MERCADO_LIVRE,
            "Mercado Livre",
            Decimal::from_parts(17, 0, 0, false, 2),
            Decimal::from(6),
        )
    }

    pub fn applies_fixed_fee(&self, selling_price: Decimal) -> bool {
        selling_price < self.fixed_fee_threshold
    }

    pub fn margin(&self, selling_price: Decimal, unit_cost: Decimal) -> Option<MarketplaceMargin> {
        compute_margin_with_threshold(
            selling_price,
            unit_cost,
            self.fee_percent,
            self.fixed_fee,
            self.fixed_fee_threshold,
        )
    }
}

/// Schedules shipped with the tool, in display order
pub fn builtin_schedules() -> Vec<FeeSchedule> {
    vec![FeeSchedule::shopee(), FeeSchedule::mercado_livre()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builtin_schedules() {
        let schedules = builtin_schedules();
        assert_eq!(schedules.len(), 2);

        assert_eq!(schedules[0].id, "shopee");
        assert_eq!(schedules[0].fee_percent, dec!(0.20));
        assert_eq!(schedules[0].fixed_fee, dec!(3.0));
        assert_eq!(schedules[0].fixed_fee_threshold, dec!(79));

        assert_eq!(schedules[1].id, "ml");
        assert_eq!(schedules[1].fee_percent, dec!(0.17));
        assert_eq!(schedules[1].fixed_fee, dec!(6.0));
    }

    #[test]
    fn test_mercado_livre_low_ticket_pays_fixed_fee() {
        let ml = FeeSchedule::mercado_livre();
        assert!(ml.applies_fixed_fee(dec!(59.90)));
        assert!(!ml.applies_fixed_fee(dec!(79)));

        let margin = ml.margin(dec!(50), dec!(20)).unwrap();
        // 50 * 0.17 + 6
        assert_eq!(margin.total_fee, dec!(14.50));
        assert_eq!(margin.profit, dec!(15.50));
        assert_eq!(margin.margin_percent, dec!(31));
    }

    #[test]
    fn test_threshold_override() {
        let shopee = FeeSchedule::shopee().with_threshold(dec!(0));
        let margin = shopee.margin(dec!(10), dec!(1)).unwrap();
        assert_eq!(margin.total_fee, dec!(2));
    }

    #[test]
    fn test_schedule_deserializes_without_threshold() {
        let toml_src = r#"
            id = "amazon"
            name = "Amazon"
            fee_percent = "0.15"
            fixed_fee = "2"
        "#;
        let schedule: FeeSchedule = toml::from_str(toml_src).unwrap();
        assert_eq!(schedule.fixed_fee_threshold, dec!(79));
        assert_eq!(schedule.fee_percent, dec!(0.15));
    }
}
