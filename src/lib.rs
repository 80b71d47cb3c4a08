pub mod analysis;
pub mod config;
pub mod error;
pub mod llm;
pub mod reports;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

pub use config::Config;

use analysis::Analyzer;
use reports::ArtifactStore;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn Analyzer>,
    pub store: ArtifactStore,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn Analyzer>, store: ArtifactStore) -> Self {
        Self { analyzer, store }
    }
}
