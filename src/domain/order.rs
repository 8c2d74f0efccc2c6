use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::package::LabelRequestRow;
use crate::domain::types::{OrderId, OrderItemId, TypeConstraintError};

/// Lifecycle state of a sales order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    New,
    PendingPayment,
    Processing,
    Complete,
    Closed,
    Canceled,
    Holded,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::New => "new",
            OrderState::PendingPayment => "pending_payment",
            OrderState::Processing => "processing",
            OrderState::Complete => "complete",
            OrderState::Closed => "closed",
            OrderState::Canceled => "canceled",
            OrderState::Holded => "holded",
        }
    }
}

impl Display for OrderState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderState::New),
            "pending_payment" => Ok(OrderState::PendingPayment),
            "processing" => Ok(OrderState::Processing),
            "complete" => Ok(OrderState::Complete),
            "closed" => Ok(OrderState::Closed),
            "canceled" => Ok(OrderState::Canceled),
            "holded" => Ok(OrderState::Holded),
            other => Err(TypeConstraintError::UnknownState(other.to_string())),
        }
    }
}

/// Single ordered product line.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub sku: String,
    pub name: String,
    pub qty_ordered: f64,
    pub qty_shipped: f64,
}

impl OrderItem {
    /// Quantity still waiting to be shipped.
    pub fn qty_to_ship(&self) -> f64 {
        (self.qty_ordered - self.qty_shipped).max(0.0)
    }
}

/// Sales order as seen by the shipping workflow.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub increment_id: String,
    pub state: OrderState,
    pub is_in_process: bool,
    pub customer_email: Option<String>,
    pub customer_note: Option<String>,
    pub customer_note_notify: bool,
    /// Per-package context handed to the label generator.
    pub extra_shipping_data: Vec<LabelRequestRow>,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn item(&self, id: OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: OrderItemId) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Whether a new shipment may be created for this order.
    pub fn can_ship(&self) -> bool {
        if matches!(
            self.state,
            OrderState::Canceled | OrderState::Closed | OrderState::Holded
        ) {
            return false;
        }
        self.items.iter().any(|item| item.qty_to_ship() > 0.0)
    }
}
