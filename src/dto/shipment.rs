//! Values exchanged between the shipment service and its route.

use serde::Serialize;

/// Body returned to the in-page label request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LabelResponse {
    Ok { ok: bool },
    Error { error: bool, message: String },
}

impl LabelResponse {
    pub fn ok() -> Self {
        LabelResponse::Ok { ok: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        LabelResponse::Error {
            error: true,
            message: message.into(),
        }
    }
}

/// What the route should answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipmentResponse {
    Redirect {
        path: String,
        params: Vec<(String, String)>,
    },
    Json(LabelResponse),
    /// Internal forward to another route, e.g. `noroute`.
    Forward(String),
}

impl ShipmentResponse {
    pub fn redirect(path: &str) -> Self {
        ShipmentResponse::Redirect {
            path: path.to_string(),
            params: Vec::new(),
        }
    }

    pub fn redirect_with_order(path: &str, order_id: impl ToString) -> Self {
        ShipmentResponse::Redirect {
            path: path.to_string(),
            params: vec![("order_id".to_string(), order_id.to_string())],
        }
    }

    /// Absolute location of a redirect, with its query string.
    pub fn location(&self) -> Option<String> {
        let ShipmentResponse::Redirect { path, params } = self else {
            return None;
        };
        if params.is_empty() {
            return Some(format!("/{path}"));
        }
        let query = serde_html_form::to_string(params).unwrap_or_default();
        Some(format!("/{path}?{query}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Message shown to the admin on the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// State carried across one request/response cycle. The caller decides how
/// it survives between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Comment text kept so a failed submission can be retried without
    /// retyping it.
    pub staged_comment: Option<String>,
}

/// Result of handling a shipment save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveShipmentOutcome {
    pub response: ShipmentResponse,
    pub notices: Vec<Notice>,
}
