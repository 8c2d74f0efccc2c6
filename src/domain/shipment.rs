use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::types::{OrderItemId, ShipmentId, TypeConstraintError};

/// Registration state of a shipment. Registered shipments are immutable.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentState {
    New,
    Registered,
}

impl ShipmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentState::New => "new",
            ShipmentState::Registered => "registered",
        }
    }
}

impl Display for ShipmentState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentState {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ShipmentState::New),
            "registered" => Ok(ShipmentState::Registered),
            other => Err(TypeConstraintError::UnknownState(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ShipmentItem {
    pub order_item_id: OrderItemId,
    pub qty: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ShipmentComment {
    pub comment: String,
    pub is_customer_notified: bool,
    pub is_visible_on_front: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ShipmentTrack {
    pub carrier_code: String,
    pub title: String,
    pub track_number: String,
}

/// Goods dispatched for an order. The shipment owns its order so both can be
/// written together.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub id: Option<ShipmentId>,
    pub order: Order,
    pub state: ShipmentState,
    pub items: Vec<ShipmentItem>,
    pub comments: Vec<ShipmentComment>,
    pub tracks: Vec<ShipmentTrack>,
    pub customer_note: Option<String>,
    pub customer_note_notify: bool,
}

impl Shipment {
    /// Starts a new, unregistered shipment for the order.
    pub fn new(order: Order) -> Self {
        Self {
            id: None,
            order,
            state: ShipmentState::New,
            items: Vec::new(),
            comments: Vec::new(),
            tracks: Vec::new(),
            customer_note: None,
            customer_note_notify: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.state == ShipmentState::New
    }

    pub fn total_qty(&self) -> f64 {
        self.items.iter().map(|item| item.qty).sum()
    }

    pub fn add_item(&mut self, order_item_id: OrderItemId, qty: f64) {
        self.items.push(ShipmentItem { order_item_id, qty });
    }

    pub fn add_track(&mut self, track: ShipmentTrack) {
        self.tracks.push(track);
    }

    pub fn add_comment(&mut self, comment: &str, notify: bool, visible_on_front: bool) {
        self.comments.push(ShipmentComment {
            comment: comment.to_string(),
            is_customer_notified: notify,
            is_visible_on_front: visible_on_front,
            created_at: Utc::now().naive_utc(),
        });
    }

    /// Moves the shipment from `new` to `registered`, booking the shipped
    /// quantities onto the order lines.
    pub fn register(&mut self) -> Result<(), DomainError> {
        if !self.is_new() {
            return Err(DomainError::ShipmentAlreadyRegistered);
        }

        if let Some(unknown) = self
            .items
            .iter()
            .find(|item| self.order.item(item.order_item_id).is_none())
        {
            return Err(DomainError::UnknownOrderItem(unknown.order_item_id.get()));
        }

        for item in &self.items {
            if let Some(order_item) = self.order.item_mut(item.order_item_id) {
                order_item.qty_shipped += item.qty;
            }
        }

        self.state = ShipmentState::Registered;
        Ok(())
    }
}
