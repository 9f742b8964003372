use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::api::state::AppState;
use crate::vat::Verdict;

pub const INVALID_METHOD_BODY: &str = "invalid_http_method";
pub const INVALID_REQUEST_BODY: &str = "invalid request";

/// Body of `POST /validate_vat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationRequest {
    #[serde(default)]
    pub vat_number: String,
}

/// Body of a 200 answer. `message` is empty when the number is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResponse {
    pub vat_number: String,
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResponse {
    pub fn new(vat_number: String, verdict: Verdict) -> Self {
        Self {
            vat_number,
            is_valid: verdict.is_valid(),
            message: verdict.message().to_string(),
        }
    }
}

/// POST /validate_vat - Validate a German VAT number
///
/// The body is decoded by hand so that a missing or wrong `Content-Type`
/// still gets the plain-text 400 instead of axum's 415. Decoding is strict:
/// the body must be exactly one JSON object and keys are case-sensitive.
pub async fn validate_vat(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<ValidationRequest>(&body) {
        Ok(req) if !req.vat_number.is_empty() => req,
        Ok(_) => {
            warn!("rejecting request without vat_number");
            return (StatusCode::BAD_REQUEST, INVALID_REQUEST_BODY).into_response();
        }
        Err(e) => {
            warn!("rejecting undecodable request body: {e}");
            return (StatusCode::BAD_REQUEST, INVALID_REQUEST_BODY).into_response();
        }
    };

    match state.validator.validate_german_vat(&request.vat_number).await {
        Ok(verdict) => {
            let response = ValidationResponse::new(request.vat_number, verdict);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            if e.is_upstream() {
                warn!("VIES check for {:?} failed: {e}", request.vat_number);
            } else {
                error!("validation of {:?} failed: {e}", request.vat_number);
            }
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// OPTIONS /validate_vat - CORS preflight, headers only
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on /validate_vat
pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, INVALID_METHOD_BODY)
}
