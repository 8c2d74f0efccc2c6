#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "server")]
pub mod publisher;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

#[cfg(feature = "server")]
pub use server::run;

#[cfg(feature = "server")]
mod server {
    use std::sync::Arc;

    use actix_cors::Cors;
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::{App, HttpServer, middleware, web};
    use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};

    use crate::db::establish_connection_pool;
    use crate::domain::validation::DocumentValidator;
    use crate::models::config::ServerConfig;
    use crate::publisher::{ZmqLabelGenerator, ZmqPublisher, ZmqShipmentSender};
    use crate::repository::DieselRepository;
    use crate::routes::not_found;
    use crate::routes::shipment::{form_key, save_shipment};
    use crate::services::ShippingServices;

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        // Publishers towards the carrier integration and the emailer.
        let context = zmq::Context::new();
        let labels = ZmqPublisher::connect(&context, &server_config.zmq_labels_pub)
            .map_err(|e| std::io::Error::other(format!("Failed to start label publisher: {e}")))?;
        let emails = ZmqPublisher::connect(&context, &server_config.zmq_emailer_pub)
            .map_err(|e| std::io::Error::other(format!("Failed to start email publisher: {e}")))?;

        // Establish Diesel connection pool for the SQLite database.
        let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
            std::io::Error::other(format!("Failed to establish database connection: {e}"))
        })?;

        let repo = Arc::new(DieselRepository::new(pool));

        let services = ShippingServices {
            orders: repo.clone(),
            shipments: repo.clone(),
            writer: repo,
            validator: Arc::new(DocumentValidator),
            labels: Arc::new(ZmqLabelGenerator::new(labels)),
            sender: Arc::new(ZmqShipmentSender::new(emails)),
        };

        // Keys and stores for sessions and flash messages.
        let secret_key = Key::from(server_config.secret.as_bytes());

        let message_store = CookieMessageStore::builder(secret_key.clone()).build();
        let message_framework = FlashMessagesFramework::builder(message_store).build();

        let bind_address = (server_config.address.clone(), server_config.port);
        log::info!("Starting shipping admin on {}:{}", bind_address.0, bind_address.1);

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(message_framework.clone())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                        .cookie_secure(false) // set to true in prod
                        .cookie_domain(Some(format!(".{}", server_config.domain)))
                        .build(),
                )
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .service(form_key)
                .service(save_shipment)
                .default_service(web::to(not_found))
                .app_data(web::Data::new(services.clone()))
                .app_data(web::Data::new(server_config.clone()))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
