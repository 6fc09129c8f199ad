use std::sync::Arc;

use crate::services::{CatalogService, FeedbackStore, MoodInterpreter};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub interpreter: Arc<dyn MoodInterpreter>,
    pub feedback: FeedbackStore,
}

impl AppState {
    pub fn new(catalog: CatalogService, interpreter: Arc<dyn MoodInterpreter>) -> Self {
        Self {
            catalog,
            interpreter,
            feedback: FeedbackStore::new(),
        }
    }
}
