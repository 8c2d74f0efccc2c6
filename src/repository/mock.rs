//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::order::Order;
use crate::domain::shipment::Shipment;
use crate::domain::types::{OrderId, ShipmentId};
use crate::repository::errors::RepositoryResult;
use crate::repository::{OrderReader, ShipmentReader, ShipmentWriter};

mock! {
    pub Repository {}

    impl OrderReader for Repository {
        fn get_order(&self, id: OrderId) -> RepositoryResult<Option<Order>>;
    }

    impl ShipmentReader for Repository {
        fn get_shipment(&self, id: ShipmentId) -> RepositoryResult<Option<Shipment>>;
    }

    impl ShipmentWriter for Repository {
        fn save_shipment_with_order(&self, shipment: &Shipment) -> RepositoryResult<ShipmentId>;
    }
}
