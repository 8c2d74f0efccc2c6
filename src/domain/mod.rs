//! Domain aggregates used by the shipping workflow.

pub mod errors;
pub mod order;
pub mod package;
pub mod shipment;
pub mod types;
pub mod validation;
