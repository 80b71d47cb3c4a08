use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;
use crate::analysis::{AnalysisOutcome, AnalysisRequest};
use crate::error::{AppError, AppResult};

/// `POST /analyze`. The body is passed to the analyzer as is; a request sent
/// without a JSON content type is treated as an empty body.
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> AppResult<Response> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => AnalysisRequest::default(),
        Err(rejection) => return Err(AppError::BadRequest(rejection.body_text())),
    };

    tracing::info!(
        analysis.code = %request.code,
        analysis.format = %request.format,
        "Analysis requested"
    );

    match state.analyzer.analyze(&request).await? {
        AnalysisOutcome::Json(result) => Ok(Json(json!({ "result": result })).into_response()),
        AnalysisOutcome::File(artifact) => super::download(&artifact).await,
    }
}
