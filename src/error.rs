use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::reports::ReportError;

/// Every failure inside analysis is a 500 carrying the underlying message.
/// Only an unreadable body (400) and unknown stored reports (404) differ.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Analysis(String),

    #[error("{0}")]
    Report(#[from] ReportError),

    #[error("{0}")]
    BadRequest(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Analysis(err.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Report(ReportError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Analysis(_) | AppError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                error = %message,
                trace_id = %get_trace_id().unwrap_or_default(),
                "Request failed"
            );
        } else {
            tracing::warn!(error = %message, "Request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
