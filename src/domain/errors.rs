use thiserror::Error;

/// Rule violations raised by the domain aggregates themselves.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was absent from submitted data.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Only shipments in the `new` state can be registered.
    #[error("We cannot register an existing shipment")]
    ShipmentAlreadyRegistered,

    /// Shipment item refers to an order line the order does not have.
    #[error("order item {0} does not belong to the order")]
    UnknownOrderItem(i32),
}
