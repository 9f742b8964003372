use std::sync::Arc;

use crate::vat::Validator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<Validator>,
}

impl AppState {
    pub fn new(validator: Validator) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }
}
