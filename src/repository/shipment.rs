//! Repository implementation for shipments.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::shipment::{Shipment, ShipmentItem};
use crate::domain::types::ShipmentId;
use crate::models::order::UpdateOrder;
use crate::models::shipment::{
    NewShipment, NewShipmentComment, NewShipmentItem, NewShipmentTrack, Shipment as DbShipment,
    ShipmentComment as DbShipmentComment, ShipmentItem as DbShipmentItem,
    ShipmentTrack as DbShipmentTrack, StoredShipment,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::order::load_order;
use crate::repository::{DieselRepository, ShipmentReader, ShipmentWriter};

impl ShipmentReader for DieselRepository {
    fn get_shipment(&self, id: ShipmentId) -> RepositoryResult<Option<Shipment>> {
        use crate::schema::{shipment_comments, shipment_items, shipment_tracks, shipments};

        let mut conn = self.conn()?;

        let Some(db_shipment) = shipments::table
            .filter(shipments::id.eq(id.get()))
            .select(DbShipment::as_select())
            .first::<DbShipment>(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let Some(order) = load_order(&mut conn, db_shipment.order_id)? else {
            return Ok(None);
        };

        let items = DbShipmentItem::belonging_to(&db_shipment)
            .select(DbShipmentItem::as_select())
            .order_by(shipment_items::id.asc())
            .load::<DbShipmentItem>(&mut conn)?;
        let comments = DbShipmentComment::belonging_to(&db_shipment)
            .select(DbShipmentComment::as_select())
            .order_by(shipment_comments::id.asc())
            .load::<DbShipmentComment>(&mut conn)?;
        let tracks = DbShipmentTrack::belonging_to(&db_shipment)
            .select(DbShipmentTrack::as_select())
            .order_by(shipment_tracks::id.asc())
            .load::<DbShipmentTrack>(&mut conn)?;

        let shipment = StoredShipment {
            shipment: db_shipment,
            items,
            comments,
            tracks,
        }
        .into_domain(order)
        .map_err(RepositoryError::from)?;

        Ok(Some(shipment))
    }
}

impl ShipmentWriter for DieselRepository {
    fn save_shipment_with_order(&self, shipment: &Shipment) -> RepositoryResult<ShipmentId> {
        use crate::schema::{orders, shipment_comments, shipment_items, shipment_tracks, shipments};

        if shipment.id.is_some() {
            return Err(RepositoryError::ValidationError(
                "existing shipments cannot be modified".to_string(),
            ));
        }

        let now = Utc::now().naive_utc();
        let order = &shipment.order;
        let update_order = UpdateOrder::from_domain(order, now);

        let mut conn = self.conn()?;

        // The write lock is held from the first read, so the quantity checks
        // see every booking committed before this one.
        conn.immediate_transaction::<ShipmentId, RepositoryError, _>(|conn| {
            for item in &shipment.items {
                book_shipped_quantity(conn, order.id.get(), item)?;
            }

            let shipment_id = diesel::insert_into(shipments::table)
                .values(NewShipment::from_domain(shipment, now))
                .returning(shipments::id)
                .get_result::<i32>(conn)?;

            let items = shipment
                .items
                .iter()
                .map(|item| NewShipmentItem::from_domain(shipment_id, item))
                .collect::<Vec<_>>();
            if !items.is_empty() {
                diesel::insert_into(shipment_items::table)
                    .values(items)
                    .execute(conn)?;
            }

            let comments = shipment
                .comments
                .iter()
                .map(|comment| NewShipmentComment::from_domain(shipment_id, comment))
                .collect::<Vec<_>>();
            if !comments.is_empty() {
                diesel::insert_into(shipment_comments::table)
                    .values(comments)
                    .execute(conn)?;
            }

            let tracks = shipment
                .tracks
                .iter()
                .map(|track| NewShipmentTrack::from_domain(shipment_id, track))
                .collect::<Vec<_>>();
            if !tracks.is_empty() {
                diesel::insert_into(shipment_tracks::table)
                    .values(tracks)
                    .execute(conn)?;
            }

            let updated = diesel::update(orders::table.filter(orders::id.eq(order.id.get())))
                .set(&update_order)
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(ShipmentId::new(shipment_id)?)
        })
    }
}

/// Adds the shipped quantity to the stored order line, refusing to ship more
/// than is left on it.
fn book_shipped_quantity(
    conn: &mut SqliteConnection,
    order_id: i32,
    item: &ShipmentItem,
) -> RepositoryResult<()> {
    use crate::schema::order_items;

    let line = order_items::table
        .filter(order_items::id.eq(item.order_item_id.get()))
        .filter(order_items::order_id.eq(order_id))
        .select((order_items::sku, order_items::qty_ordered, order_items::qty_shipped))
        .first::<(String, f64, f64)>(conn)
        .optional()?;
    let Some((sku, qty_ordered, qty_shipped)) = line else {
        return Err(RepositoryError::ValidationError(format!(
            "order item {} is not part of order {order_id}",
            item.order_item_id
        )));
    };

    if qty_shipped + item.qty > qty_ordered {
        return Err(RepositoryError::Conflict(format!(
            "The quantity to ship must not be greater than the unshipped quantity for the product SKU \"{sku}\"."
        )));
    }

    diesel::update(order_items::table.filter(order_items::id.eq(item.order_item_id.get())))
        .set(order_items::qty_shipped.eq(order_items::qty_shipped + item.qty))
        .execute(conn)?;

    Ok(())
}
