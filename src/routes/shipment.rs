//! Routes for saving shipments and requesting shipping labels.

use actix_session::Session;
use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse, Responder, get, route, web};
use actix_web_flash_messages::FlashMessage;
use serde_json::json;
use uuid::Uuid;

use crate::dto::shipment::{NoticeLevel, RequestContext, ShipmentResponse};
use crate::forms::shipment::ShipmentSubmission;
use crate::routes::{FORM_KEY_SESSION, STAGED_COMMENT_SESSION, redirect};
use crate::services::ShippingServices;
use crate::services::loader::RepositoryShipmentLoader;
use crate::services::shipment::{
    SaveShipmentRequest, ShipmentCollaborators, save_shipment as save_shipment_service,
};

#[route("/sales/order_shipment/save", method = "GET", method = "POST")]
/// Save a new shipment or, from the label dialog, request shipping labels.
pub async fn save_shipment(
    request: HttpRequest,
    body: web::Bytes,
    session: Session,
    services: web::Data<ShippingServices>,
) -> impl Responder {
    let submission = ShipmentSubmission::from_body(&body);

    let session_form_key = session
        .get::<String>(FORM_KEY_SESSION)
        .unwrap_or_else(|err| {
            log::warn!("Failed to read form key from session: {err}");
            None
        });

    let mut context = RequestContext {
        staged_comment: session
            .get::<String>(STAGED_COMMENT_SESSION)
            .ok()
            .flatten(),
    };

    let loader = RepositoryShipmentLoader::new(services.orders.as_ref(), services.shipments.as_ref());
    let collaborators = ShipmentCollaborators {
        orders: services.orders.as_ref(),
        loader: &loader,
        validator: services.validator.as_ref(),
        labels: services.labels.as_ref(),
        sender: services.sender.as_ref(),
        writer: services.writer.as_ref(),
    };

    let outcome = save_shipment_service(
        SaveShipmentRequest {
            submission,
            is_post: *request.method() == Method::POST,
            session_form_key,
        },
        &mut context,
        &collaborators,
    );

    match context.staged_comment {
        Some(comment) => {
            if let Err(err) = session.insert(STAGED_COMMENT_SESSION, comment) {
                log::error!("Failed to keep comment in session: {err}");
            }
        }
        None => {
            session.remove(STAGED_COMMENT_SESSION);
        }
    }

    for notice in outcome.notices {
        match notice.level {
            NoticeLevel::Success => FlashMessage::success(notice.text).send(),
            NoticeLevel::Error => FlashMessage::error(notice.text).send(),
        }
    }

    match outcome.response {
        ShipmentResponse::Json(body) => HttpResponse::Ok().json(body),
        ShipmentResponse::Forward(target) => {
            log::debug!("Forwarding shipment request to {target}");
            HttpResponse::NotFound().finish()
        }
        response @ ShipmentResponse::Redirect { .. } => {
            redirect(&response.location().unwrap_or_else(|| "/".to_string()))
        }
    }
}

#[get("/sales/form_key")]
/// Issue the anti-forgery token admin forms must submit as `form_key`.
pub async fn form_key(session: Session) -> impl Responder {
    let key = match session.get::<String>(FORM_KEY_SESSION) {
        Ok(Some(key)) if !key.is_empty() => key,
        _ => {
            let key = Uuid::new_v4().simple().to_string();
            if let Err(err) = session.insert(FORM_KEY_SESSION, &key) {
                log::error!("Failed to store form key in session: {err}");
                return HttpResponse::InternalServerError().finish();
            }
            key
        }
    };

    HttpResponse::Ok().json(json!({ "form_key": key }))
}
