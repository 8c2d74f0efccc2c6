//! Form definitions backing the shipping routes.

use thiserror::Error;
use validator::ValidationErrors;

pub mod nested;
pub mod shipment;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("malformed form body: {0}")]
    Malformed(String),

    #[error("invalid order id")]
    InvalidOrderId,

    #[error("invalid shipment id")]
    InvalidShipmentId,

    #[error("invalid order item id: {0}")]
    InvalidItemId(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),
}
