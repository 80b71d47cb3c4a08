use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::Response,
};
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::telemetry::metrics::REPORTS_DELETED;

fn report_id(path: Result<Path<Uuid>, PathRejection>) -> AppResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

pub async fn get_report(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let artifact = state.store.find(report_id(path)?).await?;
    super::download(&artifact).await
}

pub async fn delete_report(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<StatusCode> {
    state.store.remove(report_id(path)?).await?;
    REPORTS_DELETED.add(1, &[]);
    Ok(StatusCode::NO_CONTENT)
}
