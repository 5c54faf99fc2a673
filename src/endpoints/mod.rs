//! Request front end.
//!
//! Decodes flat string parameter maps, dispatches to the [`BusManager`]
//! and renders `(body, status)` pairs with JSON bodies. Transport-agnostic:
//! the ESP-IDF binary binds [`Router::handle`] to its HTTP server, tests
//! call it directly.
//!
//! [`BusManager`]: crate::app::service::BusManager

mod handlers;
pub mod params;
pub mod router;

use serde_json::{Value, json};

pub use params::{ParamError, Params};
pub use router::{ENDPOINTS, EndpointSpec, Router};

/// Rendered answer to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// 400 for a request whose parameters never reached the bus.
    pub fn rejected(error: &ParamError) -> Self {
        Self::json(400, &json!({ "success": false, "error": error.to_string() }))
    }

    pub fn not_found(route: &str) -> Self {
        Self::json(
            404,
            &json!({ "success": false, "error": format!("Unknown endpoint: {}", route) }),
        )
    }

    /// Parse the body back, for callers that inspect fields.
    pub fn to_value(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}
