pub mod analyze;
pub mod health;
pub mod reports;

use axum::{
    Router,
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::AppState;
use crate::error::AppResult;
use crate::reports::{ReportArtifact, ReportError};

pub const X_REPORT_ID: HeaderName = HeaderName::from_static("x-report-id");

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/analyze", post(analyze::analyze))
        .route(
            "/reports/{id}",
            get(reports::get_report).delete(reports::delete_report),
        )
        .with_state(state)
}

/// Sends a stored report as an attachment. The artifact stays on disk until
/// the caller deletes it through `DELETE /reports/{id}`.
pub(crate) async fn download(artifact: &ReportArtifact) -> AppResult<Response> {
    let bytes = tokio::fs::read(&artifact.path)
        .await
        .map_err(ReportError::from)?;
    let file_name = artifact.file_name();

    tracing::info!(
        report.id = %artifact.id,
        report.format = %artifact.format,
        size = bytes.len(),
        "Sending report"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
            (X_REPORT_ID, artifact.id.to_string()),
        ],
        bytes,
    )
        .into_response())
}
