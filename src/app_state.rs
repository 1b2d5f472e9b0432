use std::sync::Arc;

use crate::models::verification::VerifyOptions;
use crate::services::{face::FaceComparer, staging::ScratchDir};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub comparer: Arc<dyn FaceComparer>,
    pub scratch: Arc<ScratchDir>,
    pub options: VerifyOptions,
}

impl AppState {
    pub fn new(
        comparer: impl FaceComparer + 'static,
        scratch: ScratchDir,
        options: VerifyOptions,
    ) -> Self {
        Self {
            comparer: Arc::new(comparer),
            scratch: Arc::new(scratch),
            options,
        }
    }
}
