//! Business rules checked before a shipment document is persisted.

use serde::Serialize;

use crate::domain::shipment::Shipment;

/// Rules a shipment can be validated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShipmentRule {
    /// Shipped quantities must fit what is still unshipped on the order.
    Quantity,
}

/// Messages collected while validating a shipment. Any message blocks saving.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ValidationResult {
    messages: Vec<String>,
}

impl ValidationResult {
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Validates a shipment against a set of rules.
pub trait ShipmentValidator {
    fn validate(&self, shipment: &Shipment, rules: &[ShipmentRule]) -> ValidationResult;
}

/// Validator evaluating rules against the order carried by the shipment.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentValidator;

impl ShipmentValidator for DocumentValidator {
    fn validate(&self, shipment: &Shipment, rules: &[ShipmentRule]) -> ValidationResult {
        let mut result = ValidationResult::default();
        for rule in rules {
            match rule {
                ShipmentRule::Quantity => check_quantities(shipment, &mut result),
            }
        }
        result
    }
}

fn check_quantities(shipment: &Shipment, result: &mut ValidationResult) {
    for item in &shipment.items {
        let Some(order_item) = shipment.order.item(item.order_item_id) else {
            result.add_message(format!(
                "The shipment contains product SKU \"{}\" that is not part of the original order.",
                item.order_item_id
            ));
            continue;
        };

        if item.qty <= 0.0 {
            result.add_message(format!(
                "The quantity to ship for the product SKU \"{}\" must be greater than zero.",
                order_item.sku
            ));
        } else if shipment.is_new() && item.qty > order_item.qty_to_ship() {
            result.add_message(format!(
                "The quantity to ship must not be greater than the unshipped quantity for the product SKU \"{}\".",
                order_item.sku
            ));
        }
    }
}
