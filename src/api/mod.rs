//! HTTP surface: a single `/validate_vat` endpoint.

mod cors;
mod handlers;
mod router;
mod state;

pub use cors::{ALLOWED_HEADERS, ALLOWED_METHODS, ALLOWED_ORIGIN, add_cors_headers};
pub use handlers::{
    INVALID_METHOD_BODY, INVALID_REQUEST_BODY, ValidationRequest, ValidationResponse,
    method_not_allowed, preflight, validate_vat,
};
pub use router::create_router;
pub use state::AppState;
