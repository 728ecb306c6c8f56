use std::path::PathBuf;
use std::sync::Arc;

use crate::pipeline::SimilarityPipeline;

#[derive(Clone)]
pub struct HandlerState {
    pub pipeline: Arc<SimilarityPipeline>,

    /// Backend name reported by `/healthz`.
    pub store_backend: &'static str,

    /// Frontend assets served for unmatched routes.
    pub static_dir: Option<PathBuf>,
}

impl HandlerState {
    pub fn new(pipeline: Arc<SimilarityPipeline>, store_backend: &'static str) -> Self {
        Self {
            pipeline,
            store_backend,
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }
}
