//! Mock collaborators for isolating the shipment service in tests.

use mockall::mock;

use crate::domain::order::Order;
use crate::domain::package::Package;
use crate::domain::shipment::Shipment;
use crate::domain::types::ShipmentId;
use crate::domain::validation::{ShipmentRule, ShipmentValidator, ValidationResult};
use crate::services::loader::{ShipmentLoadQuery, ShipmentLoader};
use crate::services::{LabelGenerator, ServiceResult, ShipmentSender};

mock! {
    pub Loader {}

    impl ShipmentLoader for Loader {
        fn load(&self, query: ShipmentLoadQuery) -> ServiceResult<Option<Shipment>>;
    }
}

mock! {
    pub Validator {}

    impl ShipmentValidator for Validator {
        fn validate(&self, shipment: &Shipment, rules: &[ShipmentRule]) -> ValidationResult;
    }
}

mock! {
    pub Labels {}

    impl LabelGenerator for Labels {
        fn generate_shipping_label(
            &self,
            order: &Order,
            label_id: Option<ShipmentId>,
            packages: &[Package],
        ) -> ServiceResult<()>;
    }
}

mock! {
    pub Sender {}

    impl ShipmentSender for Sender {
        fn send(&self, shipment: &Shipment) -> ServiceResult<()>;
    }
}
