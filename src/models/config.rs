//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub secret: String,
    /// Endpoint of the carrier integration consuming label requests.
    pub zmq_labels_pub: String,
    /// Endpoint of the emailer consuming shipment notifications.
    pub zmq_emailer_pub: String,
}
