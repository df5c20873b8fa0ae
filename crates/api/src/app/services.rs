use std::sync::Arc;

use yatube_blog::{BlogStore, PaginationPolicy};

/// State shared by all resource routes.
pub struct AppServices {
    pub store: Arc<dyn BlogStore>,
    pub pagination: PaginationPolicy,
}

impl AppServices {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self {
            store,
            pagination: PaginationPolicy::default(),
        }
    }

    pub fn store(&self) -> &dyn BlogStore {
        self.store.as_ref()
    }
}
