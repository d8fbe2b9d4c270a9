use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marketplace id of Shopee in the built-in fee schedules
pub const SHOPEE: &str = "shopee";
/// Marketplace id of Mercado Livre in the built-in fee schedules
pub const MERCADO_LIVRE: &str = "ml";

/// Parameters of a single import shipment.
///
/// Amounts ending in `_usd` are in the supplier's currency; selling prices are
/// in BRL. `icms_rate` is a percentage (19 means 19%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportInputs {
    pub quantity: u32,
    pub unit_price_usd: Decimal,
    /// Freight for the whole shipment, not per unit
    pub freight_usd: Decimal,
    pub exchange_rate: Decimal,
    pub icms_rate: Decimal,
    /// Listing price per marketplace id (e.g. "shopee", "ml")
    #[serde(default)]
    pub selling_prices: BTreeMap<String, Decimal>,
}

impl ImportInputs {
    pub fn new(
        quantity: u32,
        unit_price_usd: Decimal,
        freight_usd: Decimal,
        exchange_rate: Decimal,
        icms_rate: Decimal,
    ) -> Self {
        Self {
            quantity,
            unit_price_usd,
            freight_usd,
            exchange_rate,
            icms_rate,
            selling_prices: BTreeMap::new(),
        }
    }

    pub fn with_selling_price(mut self, marketplace: &str, price: Decimal) -> Self {
        self.set_selling_price(marketplace, price);
        self
    }

    /// Marketplace ids are stored lowercase so `Shopee` and `shopee` are one entry
    pub fn set_selling_price(&mut self, marketplace: &str, price: Decimal) {
        self.selling_prices
            .insert(marketplace.trim().to_ascii_lowercase(), price);
    }

    pub fn selling_price(&self, marketplace: &str) -> Option<Decimal> {
        self.selling_prices
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(marketplace))
            .map(|(_, price)| *price)
    }
}
