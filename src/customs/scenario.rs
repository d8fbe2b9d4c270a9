use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculator::{compute_customs_cost, CalculationResult};
use super::inputs::ImportInputs;

/// A named fraction of the true unit price declared to customs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationScenario {
    pub id: String,
    pub label: String,
    pub ratio: Decimal,
}

impl DeclarationScenario {
    pub fn new(id: impl Into<String>, label: impl Into<String>, ratio: Decimal) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ratio,
        }
    }

    /// Honest declaration of the full invoice value
    pub fn full() -> Self {
        Self::new("full", "Invoice 100%", Decimal::ONE)
    }

    /// Invoice understated to 30% of the real value
    pub fn reduced() -> Self {
        Self::new("reduced", "Invoice 30%", Decimal::from_parts(3, 0, 0, false, 1))
    }

    pub fn compute(&self, inputs: &ImportInputs) -> Option<CalculationResult> {
        compute_customs_cost(inputs, self.ratio)
    }
}

/// Ordered set of declaration scenarios, looked up by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioSet(Vec<DeclarationScenario>);

impl ScenarioSet {
    pub fn new(scenarios: Vec<DeclarationScenario>) -> Self {
        Self(scenarios)
    }

    pub fn get(&self, id: &str) -> Option<&DeclarationScenario> {
        self.0.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeclarationScenario> {
        self.0.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First id that appears more than once, if any
    pub fn duplicate_id(&self) -> Option<&str> {
        self.0.iter().enumerate().find_map(|(idx, s)| {
            self.0[..idx]
                .iter()
                .any(|earlier| earlier.id.eq_ignore_ascii_case(&s.id))
                .then_some(s.id.as_str())
        })
    }

    /// Evaluate every scenario against the same inputs, in set order
    pub fn compute_all<'a>(
        &'a self,
        inputs: &ImportInputs,
    ) -> Vec<(&'a DeclarationScenario, Option<CalculationResult>)> {
        self.0.iter().map(|s| (s, s.compute(inputs))).collect()
    }
}

impl Default for ScenarioSet {
    fn default() -> Self {
        Self(vec![DeclarationScenario::full(), DeclarationScenario::reduced()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builtin_ratios() {
        assert_eq!(DeclarationScenario::full().ratio, dec!(1.0));
        assert_eq!(DeclarationScenario::reduced().ratio, dec!(0.3));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let set = ScenarioSet::default();
        assert_eq!(set.get("FULL").map(|s| s.ratio), Some(dec!(1)));
        assert_eq!(set.get("reduced").map(|s| s.ratio), Some(dec!(0.3)));
        assert!(set.get("half").is_none());
        assert_eq!(set.ids(), vec!["full", "reduced"]);
    }

    #[test]
    fn test_duplicate_id_detection() {
        assert_eq!(ScenarioSet::default().duplicate_id(), None);

        let set = ScenarioSet::new(vec![
            DeclarationScenario::full(),
            DeclarationScenario::new("half", "Invoice 50%", dec!(0.5)),
            DeclarationScenario::new("Full", "Again", dec!(1)),
        ]);
        assert_eq!(set.duplicate_id(), Some("Full"));
    }

    #[test]
    fn test_compute_all_shares_real_cost() {
        let inputs = ImportInputs::new(100, dec!(10), dec!(50), dec!(5.40), dec!(19));
        let set = ScenarioSet::new(vec![
            DeclarationScenario::full(),
            DeclarationScenario::new("half", "Invoice 50%", dec!(0.5)),
            DeclarationScenario::reduced(),
        ]);

        let results = set.compute_all(&inputs);
        assert_eq!(results.len(), 3);
        for (_, result) in &results {
            let result = result.as_ref().unwrap();
            assert_eq!(result.product_total, dec!(5400));
            assert_eq!(result.freight_total, dec!(270));
        }
        assert_eq!(results[1].1.as_ref().unwrap().declared_product_total, dec!(2700));
    }
}
