use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::order::Order;
use crate::domain::shipment::Shipment;
use crate::domain::types::{OrderId, ShipmentId};
use crate::repository::errors::RepositoryResult;

pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod order;
pub mod shipment;

/// Diesel-backed repository implementing every reader and writer trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

pub trait OrderReader {
    /// Loads the order together with its items.
    fn get_order(&self, id: OrderId) -> RepositoryResult<Option<Order>>;
}

pub trait ShipmentReader {
    /// Loads a stored shipment together with the order it belongs to.
    fn get_shipment(&self, id: ShipmentId) -> RepositoryResult<Option<Shipment>>;
}

pub trait ShipmentWriter {
    /// Persists a new shipment and its order in one transaction.
    ///
    /// Either both are written or neither is.
    fn save_shipment_with_order(&self, shipment: &Shipment) -> RepositoryResult<ShipmentId>;
}
