//! DTO modules that bridge services with routes.

pub mod shipment;
