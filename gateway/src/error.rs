//! Error taxonomy for the gateway and its HTTP mapping.
//!
//! Every variant renders as `{"error": "<message>"}`; the message is what a
//! browser client shows the user, so store details stay in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::store::StoreError;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const ID_REQUIRED: &str = "Todo ID is required";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required field is missing, blank or malformed.
    #[error("{0}")]
    InvalidInput(String),

    /// No record has the referenced id.
    #[error("Todo not found")]
    NotFound,

    /// The backing store failed; `message` names the operation.
    #[error("{message}")]
    StoreUnavailable {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    /// Anything not covered above, caught at the HTTP boundary.
    #[error("Internal server error")]
    Unexpected(String),
}

impl GatewayError {
    pub fn invalid(message: impl Into<String>) -> Self {
        GatewayError::InvalidInput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::StoreUnavailable { .. } | GatewayError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
