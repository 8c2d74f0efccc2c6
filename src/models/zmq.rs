use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::Order;
use crate::domain::package::{LabelRequestRow, Package};
use crate::domain::shipment::Shipment;
use crate::domain::types::ShipmentId;

/// Label request published to the carrier integration.
#[derive(Debug, Deserialize, Serialize)]
pub struct ZmqLabelRequest {
    pub request_id: Uuid,
    pub order_id: i32,
    pub increment_id: String,
    pub label_id: Option<i32>,
    pub rows: Vec<LabelRequestRow>,
    pub packages: Vec<Package>,
}

impl ZmqLabelRequest {
    pub fn new(order: &Order, label_id: Option<ShipmentId>, packages: &[Package]) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            order_id: order.id.get(),
            increment_id: order.increment_id.clone(),
            label_id: label_id.map(|id| id.get()),
            rows: order.extra_shipping_data.clone(),
            packages: packages.to_vec(),
        }
    }
}

/// Customer notification published to the emailer.
#[derive(Debug, Deserialize, Serialize)]
pub struct ZmqShipmentEmail {
    pub order_id: i32,
    pub increment_id: String,
    pub shipment_id: Option<i32>,
    pub recipient: String,
    pub comment: Option<String>,
    /// `comment` escaped for the HTML body of the email.
    pub comment_html: Option<String>,
    pub tracks: Vec<ZmqTrack>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ZmqTrack {
    pub title: String,
    pub number: String,
}

impl ZmqShipmentEmail {
    /// `None` when the order has no customer address to write to.
    pub fn for_shipment(shipment: &Shipment) -> Option<Self> {
        let recipient = shipment
            .order
            .customer_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())?;

        // Only comments the customer was meant to see go into the email.
        let comment = shipment
            .customer_note_notify
            .then(|| shipment.customer_note.clone())
            .flatten();

        Some(Self {
            order_id: shipment.order.id.get(),
            increment_id: shipment.order.increment_id.clone(),
            shipment_id: shipment.id.map(|id| id.get()),
            recipient: recipient.to_string(),
            comment_html: comment.as_deref().map(ammonia::clean_text),
            comment,
            tracks: shipment
                .tracks
                .iter()
                .map(|track| ZmqTrack {
                    title: track.title.clone(),
                    number: track.track_number.clone(),
                })
                .collect(),
        })
    }
}
