use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::order::{Order as DomainOrder, OrderItem as DomainOrderItem};
use crate::domain::package::LabelRequestRow;
use crate::domain::types::{OrderId, OrderItemId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
/// Diesel model for [`crate::domain::order::Order`].
pub struct Order {
    pub id: i32,
    pub increment_id: String,
    pub state: String,
    pub is_in_process: bool,
    pub customer_email: Option<String>,
    pub customer_note: Option<String>,
    pub customer_note_notify: bool,
    pub extra_shipping_data: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub sku: String,
    pub name: String,
    pub qty_ordered: f64,
    pub qty_shipped: f64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub increment_id: &'a str,
    pub state: &'a str,
    pub customer_email: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem<'a> {
    pub order_id: i32,
    pub sku: &'a str,
    pub name: &'a str,
    pub qty_ordered: f64,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::orders)]
/// Order columns touched when a shipment is saved. A missing note leaves the
/// stored one alone.
pub struct UpdateOrder<'a> {
    pub is_in_process: bool,
    pub customer_note: Option<&'a str>,
    pub customer_note_notify: bool,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<OrderItem> for DomainOrderItem {
    type Error = TypeConstraintError;

    fn try_from(item: OrderItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderItemId::new(item.id)?,
            sku: item.sku,
            name: item.name,
            qty_ordered: item.qty_ordered,
            qty_shipped: item.qty_shipped,
        })
    }
}

impl TryFrom<(Order, Vec<OrderItem>)> for DomainOrder {
    type Error = TypeConstraintError;

    fn try_from((order, items): (Order, Vec<OrderItem>)) -> Result<Self, Self::Error> {
        let extra_shipping_data = match order.extra_shipping_data.as_deref() {
            Some(raw) if !raw.is_empty() => serde_json::from_str::<Vec<LabelRequestRow>>(raw)
                .map_err(|e| TypeConstraintError::InvalidValue(e.to_string()))?,
            _ => Vec::new(),
        };

        Ok(Self {
            id: OrderId::new(order.id)?,
            increment_id: order.increment_id,
            state: order.state.parse()?,
            is_in_process: order.is_in_process,
            customer_email: order.customer_email,
            customer_note: order.customer_note,
            customer_note_notify: order.customer_note_notify,
            extra_shipping_data,
            items: items
                .into_iter()
                .map(DomainOrderItem::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl<'a> UpdateOrder<'a> {
    pub fn from_domain(order: &'a DomainOrder, now: NaiveDateTime) -> Self {
        Self {
            is_in_process: order.is_in_process,
            customer_note: order.customer_note.as_deref(),
            customer_note_notify: order.customer_note_notify,
            updated_at: now,
        }
    }
}
