use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::order::Order as DomainOrder;
use crate::domain::shipment::{
    Shipment as DomainShipment, ShipmentComment as DomainShipmentComment,
    ShipmentItem as DomainShipmentItem, ShipmentTrack as DomainShipmentTrack,
};
use crate::domain::types::{OrderItemId, ShipmentId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::shipments)]
/// Diesel model for [`crate::domain::shipment::Shipment`].
pub struct Shipment {
    pub id: i32,
    pub order_id: i32,
    pub state: String,
    pub total_qty: f64,
    pub customer_note: Option<String>,
    pub customer_note_notify: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::shipment_items)]
#[diesel(belongs_to(Shipment, foreign_key = shipment_id))]
pub struct ShipmentItem {
    pub id: i32,
    pub shipment_id: i32,
    pub order_item_id: i32,
    pub qty: f64,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::shipment_comments)]
#[diesel(belongs_to(Shipment, foreign_key = shipment_id))]
pub struct ShipmentComment {
    pub id: i32,
    pub shipment_id: i32,
    pub comment: String,
    pub is_customer_notified: bool,
    pub is_visible_on_front: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::shipment_tracks)]
#[diesel(belongs_to(Shipment, foreign_key = shipment_id))]
pub struct ShipmentTrack {
    pub id: i32,
    pub shipment_id: i32,
    pub carrier_code: String,
    pub title: String,
    pub track_number: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::shipments)]
pub struct NewShipment<'a> {
    pub order_id: i32,
    pub state: &'a str,
    pub total_qty: f64,
    pub customer_note: Option<&'a str>,
    pub customer_note_notify: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::shipment_items)]
pub struct NewShipmentItem {
    pub shipment_id: i32,
    pub order_item_id: i32,
    pub qty: f64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::shipment_comments)]
pub struct NewShipmentComment<'a> {
    pub shipment_id: i32,
    pub comment: &'a str,
    pub is_customer_notified: bool,
    pub is_visible_on_front: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::shipment_tracks)]
pub struct NewShipmentTrack<'a> {
    pub shipment_id: i32,
    pub carrier_code: &'a str,
    pub title: &'a str,
    pub track_number: &'a str,
}

impl<'a> NewShipment<'a> {
    pub fn from_domain(shipment: &'a DomainShipment, now: NaiveDateTime) -> Self {
        Self {
            order_id: shipment.order.id.get(),
            state: shipment.state.as_str(),
            total_qty: shipment.total_qty(),
            customer_note: shipment.customer_note.as_deref(),
            customer_note_notify: shipment.customer_note_notify,
            created_at: now,
        }
    }
}

impl NewShipmentItem {
    pub fn from_domain(shipment_id: i32, item: &DomainShipmentItem) -> Self {
        Self {
            shipment_id,
            order_item_id: item.order_item_id.get(),
            qty: item.qty,
        }
    }
}

impl<'a> NewShipmentComment<'a> {
    pub fn from_domain(shipment_id: i32, comment: &'a DomainShipmentComment) -> Self {
        Self {
            shipment_id,
            comment: comment.comment.as_str(),
            is_customer_notified: comment.is_customer_notified,
            is_visible_on_front: comment.is_visible_on_front,
            created_at: comment.created_at,
        }
    }
}

impl<'a> NewShipmentTrack<'a> {
    pub fn from_domain(shipment_id: i32, track: &'a DomainShipmentTrack) -> Self {
        Self {
            shipment_id,
            carrier_code: track.carrier_code.as_str(),
            title: track.title.as_str(),
            track_number: track.track_number.as_str(),
        }
    }
}

/// Rows making up one stored shipment.
pub struct StoredShipment {
    pub shipment: Shipment,
    pub items: Vec<ShipmentItem>,
    pub comments: Vec<ShipmentComment>,
    pub tracks: Vec<ShipmentTrack>,
}

impl StoredShipment {
    pub fn into_domain(self, order: DomainOrder) -> Result<DomainShipment, TypeConstraintError> {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                Ok(DomainShipmentItem {
                    order_item_id: OrderItemId::new(item.order_item_id)?,
                    qty: item.qty,
                })
            })
            .collect::<Result<Vec<_>, TypeConstraintError>>()?;

        Ok(DomainShipment {
            id: Some(ShipmentId::new(self.shipment.id)?),
            order,
            state: self.shipment.state.parse()?,
            items,
            comments: self
                .comments
                .into_iter()
                .map(|comment| DomainShipmentComment {
                    comment: comment.comment,
                    is_customer_notified: comment.is_customer_notified,
                    is_visible_on_front: comment.is_visible_on_front,
                    created_at: comment.created_at,
                })
                .collect(),
            tracks: self
                .tracks
                .into_iter()
                .map(|track| DomainShipmentTrack {
                    carrier_code: track.carrier_code,
                    title: track.title,
                    track_number: track.track_number,
                })
                .collect(),
            customer_note: self.shipment.customer_note,
            customer_note_notify: self.shipment.customer_note_notify,
        })
    }
}
