//! HTTP routes of the shipping admin.

use actix_web::HttpResponse;
use actix_web::http::header;

pub mod shipment;

/// Session key holding the anti-forgery token issued to the browser.
pub const FORM_KEY_SESSION: &str = "form_key";
/// Session key holding a comment typed into a form that failed to save.
pub const STAGED_COMMENT_SESSION: &str = "comment_text";

/// `303 See Other` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Fallback for unknown routes and unresolvable entities.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().finish()
}
