//! ZeroMQ publishers for label requests and shipment emails.

use std::sync::Mutex;

use serde::Serialize;

use crate::domain::order::Order;
use crate::domain::package::Package;
use crate::domain::shipment::Shipment;
use crate::domain::types::ShipmentId;
use crate::models::zmq::{ZmqLabelRequest, ZmqShipmentEmail};
use crate::services::{LabelGenerator, ServiceError, ServiceResult, ShipmentSender};

pub const NO_PACKAGES: &str = "No packages for request";

/// Sink for serialized messages.
pub trait MessagePublisher {
    fn publish(&self, payload: &[u8]) -> ServiceResult<()>;
}

/// PUB socket connected to a downstream worker.
pub struct ZmqPublisher {
    endpoint: String,
    socket: Mutex<zmq::Socket>,
}

impl ZmqPublisher {
    pub fn connect(context: &zmq::Context, endpoint: &str) -> Result<Self, zmq::Error> {
        let socket = context.socket(zmq::PUB)?;
        socket.connect(endpoint)?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            socket: Mutex::new(socket),
        })
    }
}

impl MessagePublisher for ZmqPublisher {
    fn publish(&self, payload: &[u8]) -> ServiceResult<()> {
        let socket = self
            .socket
            .lock()
            .map_err(|_| ServiceError::Internal("zmq socket lock poisoned".to_string()))?;
        socket
            .send(payload, 0)
            .map_err(|e| ServiceError::Publish(format!("{}: {e}", self.endpoint)))
    }
}

fn publish_json<P: MessagePublisher, T: Serialize>(publisher: &P, message: &T) -> ServiceResult<()> {
    let payload = serde_json::to_vec(message).map_err(|e| ServiceError::Internal(e.to_string()))?;
    publisher.publish(&payload)
}

/// Hands label requests to the carrier integration.
pub struct ZmqLabelGenerator<P = ZmqPublisher> {
    publisher: P,
}

impl<P> ZmqLabelGenerator<P> {
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }
}

impl<P: MessagePublisher> LabelGenerator for ZmqLabelGenerator<P> {
    fn generate_shipping_label(
        &self,
        order: &Order,
        label_id: Option<ShipmentId>,
        packages: &[Package],
    ) -> ServiceResult<()> {
        if packages.is_empty() {
            return Err(ServiceError::Localized(NO_PACKAGES.to_string()));
        }

        let request = ZmqLabelRequest::new(order, label_id, packages);
        publish_json(&self.publisher, &request)?;
        log::info!(
            "Published label request {} for order {}",
            request.request_id,
            order.increment_id
        );
        Ok(())
    }
}

/// Sends the "your order has shipped" email through the emailer worker.
pub struct ZmqShipmentSender<P = ZmqPublisher> {
    publisher: P,
}

impl<P> ZmqShipmentSender<P> {
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }
}

impl<P: MessagePublisher> ShipmentSender for ZmqShipmentSender<P> {
    fn send(&self, shipment: &Shipment) -> ServiceResult<()> {
        let Some(email) = ZmqShipmentEmail::for_shipment(shipment) else {
            log::warn!(
                "Order {} has no customer email, shipment email skipped",
                shipment.order.increment_id
            );
            return Ok(());
        };
        publish_json(&self.publisher, &email)
    }
}
