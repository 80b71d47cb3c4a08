pub mod llm;
pub mod params;
pub mod prompt;

use serde::Deserialize;

use crate::reports::ReportArtifact;

pub use llm::LlmAnalyzer;
pub use params::{AnalysisParams, Language};

/// Body of `POST /analyze`. Every field is optional on the wire; the analysis
/// routine decides what a missing value means.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub format: String,
}

/// What an analysis produced. The front door branches on this tag only.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Json(serde_json::Value),
    File(ReportArtifact),
}

#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> anyhow::Result<AnalysisOutcome>;
}
