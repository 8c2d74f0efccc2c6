//! Database models shared across the shipping repository.

#[cfg(feature = "server")]
pub mod config;
pub mod order;
pub mod shipment;
#[cfg(feature = "server")]
pub mod zmq;
