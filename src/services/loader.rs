//! Resolves the shipment a save request operates on.

use crate::domain::shipment::{Shipment, ShipmentTrack};
use crate::domain::types::{OrderId, OrderItemId, ShipmentId};
use crate::repository::{OrderReader, ShipmentReader};
use crate::services::{ServiceError, ServiceResult};

pub const ORDER_CANNOT_SHIP: &str = "The order does not allow a shipment to be created.";
pub const NO_PRODUCTS: &str =
    "Shipment Document Validation Error(s):\nYou can't create a shipment without products.";
pub const TRACKING_NUMBER_REQUIRED: &str = "Please enter a tracking number.";

/// Identifiers and submitted data describing the target shipment.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentLoadQuery {
    pub order_id: OrderId,
    pub shipment_id: Option<ShipmentId>,
    /// Requested quantities by order line. Empty means everything left.
    pub items: Vec<(OrderItemId, f64)>,
    pub tracking: Vec<ShipmentTrack>,
}

impl ShipmentLoadQuery {
    pub fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            shipment_id: None,
            items: Vec::new(),
            tracking: Vec::new(),
        }
    }

    pub fn shipment_id(mut self, shipment_id: Option<ShipmentId>) -> Self {
        self.shipment_id = shipment_id;
        self
    }

    pub fn items(mut self, items: Vec<(OrderItemId, f64)>) -> Self {
        self.items = items;
        self
    }

    pub fn tracking(mut self, tracking: Vec<ShipmentTrack>) -> Self {
        self.tracking = tracking;
        self
    }
}

/// Resolves or builds a shipment. `Ok(None)` means the target does not exist.
pub trait ShipmentLoader {
    fn load(&self, query: ShipmentLoadQuery) -> ServiceResult<Option<Shipment>>;
}

/// Loader reading orders and stored shipments through the repository.
pub struct RepositoryShipmentLoader<'a> {
    orders: &'a dyn OrderReader,
    shipments: &'a dyn ShipmentReader,
}

impl<'a> RepositoryShipmentLoader<'a> {
    pub fn new(orders: &'a dyn OrderReader, shipments: &'a dyn ShipmentReader) -> Self {
        Self { orders, shipments }
    }
}

impl ShipmentLoader for RepositoryShipmentLoader<'_> {
    fn load(&self, query: ShipmentLoadQuery) -> ServiceResult<Option<Shipment>> {
        if let Some(shipment_id) = query.shipment_id {
            let shipment = self.shipments.get_shipment(shipment_id)?;
            return Ok(shipment.filter(|shipment| shipment.order.id == query.order_id));
        }

        let Some(order) = self.orders.get_order(query.order_id)? else {
            log::warn!("Order {} not found while loading shipment", query.order_id);
            return Ok(None);
        };

        if !order.can_ship() {
            return Err(ServiceError::Localized(ORDER_CANNOT_SHIP.to_string()));
        }

        let mut shipment = Shipment::new(order);

        if query.items.is_empty() {
            let remaining = shipment
                .order
                .items
                .iter()
                .filter(|item| item.qty_to_ship() > 0.0)
                .map(|item| (item.id, item.qty_to_ship()))
                .collect::<Vec<_>>();
            for (id, qty) in remaining {
                shipment.add_item(id, qty);
            }
        } else {
            for (id, qty) in query.items.into_iter().filter(|(_, qty)| *qty > 0.0) {
                shipment.add_item(id, qty);
            }
        }

        if shipment.total_qty() <= 0.0 {
            return Err(ServiceError::Localized(NO_PRODUCTS.to_string()));
        }

        for track in query.tracking {
            if track.track_number.is_empty() {
                return Err(ServiceError::Localized(TRACKING_NUMBER_REQUIRED.to_string()));
            }
            shipment.add_track(track);
        }

        Ok(Some(shipment))
    }
}
