//! Repository implementation for sales orders.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::order::Order;
use crate::domain::types::OrderId;
use crate::models::order::{Order as DbOrder, OrderItem as DbOrderItem};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, OrderReader};

/// Reads the order and its items on an already acquired connection.
pub(crate) fn load_order(conn: &mut SqliteConnection, id: i32) -> RepositoryResult<Option<Order>> {
    use crate::schema::orders;

    let Some(db_order) = orders::table
        .filter(orders::id.eq(id))
        .select(DbOrder::as_select())
        .first::<DbOrder>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let items = DbOrderItem::belonging_to(&db_order)
        .select(DbOrderItem::as_select())
        .order_by(crate::schema::order_items::id.asc())
        .load::<DbOrderItem>(conn)?;

    let order = Order::try_from((db_order, items)).map_err(RepositoryError::from)?;
    Ok(Some(order))
}

impl OrderReader for DieselRepository {
    fn get_order(&self, id: OrderId) -> RepositoryResult<Option<Order>> {
        let mut conn = self.conn()?;
        load_order(&mut conn, id.get())
    }
}
