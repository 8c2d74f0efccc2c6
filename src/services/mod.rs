use std::sync::Arc;

use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::package::Package;
use crate::domain::shipment::Shipment;
use crate::domain::types::ShipmentId;
use crate::domain::validation::ShipmentValidator;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;
use crate::repository::{OrderReader, ShipmentReader, ShipmentWriter};

pub mod loader;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod shipment;

/// Errors surfaced by the shipping services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Expected, user-facing failure. The message is shown verbatim.
    #[error("{0}")]
    Localized(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid form: {0}")]
    Form(#[from] FormError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to publish message: {0}")]
    Publish(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Message that may be shown to the admin, or `None` when the error must
    /// be replaced by a generic message.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ServiceError::Localized(message) => Some(message.clone()),
            ServiceError::Form(_) => Some(INVALID_FORM.to_string()),
            ServiceError::Repository(RepositoryError::NotFound) => Some(ENTITY_NOT_FOUND.to_string()),
            ServiceError::Repository(RepositoryError::Conflict(message)) => Some(message.clone()),
            _ => None,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::MissingField(field) => ServiceError::MissingField(field),
            other => ServiceError::Localized(other.to_string()),
        }
    }
}

pub const ENTITY_NOT_FOUND: &str =
    "The entity that was requested doesn't exist. Verify the entity and try again.";
pub const INVALID_FORM: &str = "The submitted shipment data is invalid.";

/// Asks the carrier integration for shipping labels.
pub trait LabelGenerator {
    /// `order.extra_shipping_data` carries one row per package.
    fn generate_shipping_label(
        &self,
        order: &Order,
        label_id: Option<ShipmentId>,
        packages: &[Package],
    ) -> ServiceResult<()>;
}

/// Notifies the customer about a saved shipment.
pub trait ShipmentSender {
    fn send(&self, shipment: &Shipment) -> ServiceResult<()>;
}

/// Collaborators shared by all workers, registered as application data.
#[derive(Clone)]
pub struct ShippingServices {
    pub orders: Arc<dyn OrderReader + Send + Sync>,
    pub shipments: Arc<dyn ShipmentReader + Send + Sync>,
    pub writer: Arc<dyn ShipmentWriter + Send + Sync>,
    pub validator: Arc<dyn ShipmentValidator + Send + Sync>,
    pub labels: Arc<dyn LabelGenerator + Send + Sync>,
    pub sender: Arc<dyn ShipmentSender + Send + Sync>,
}
