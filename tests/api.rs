use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use analysis_service::AppState;
use analysis_service::analysis::{AnalysisOutcome, AnalysisRequest, Analyzer};
use analysis_service::reports::{
    ArtifactStore, ReportArtifact, ReportFormat, ReportMeta, to_pdf_report,
};
use analysis_service::routes::create_router;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::util::ServiceExt;

/// Returns a canned outcome and records every request it receives.
struct StubAnalyzer {
    reply: Reply,
    seen: Mutex<Vec<AnalysisRequest>>,
}

enum Reply {
    Json(Value),
    Fail(&'static str),
    PdfIn(ArtifactStore),
}

#[async_trait::async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> anyhow::Result<AnalysisOutcome> {
        self.seen.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Json(value) => Ok(AnalysisOutcome::Json(value.clone())),
            Reply::Fail(msg) => Err(anyhow::anyhow!(*msg)),
            Reply::PdfIn(store) => {
                let (id, dir) = store.allocate().await?;
                let path = to_pdf_report("hello\\nworld", &ReportMeta::new("T", "X"), &dir)?;
                Ok(AnalysisOutcome::File(ReportArtifact {
                    id,
                    format: ReportFormat::Pdf,
                    path,
                }))
            }
        }
    }
}

struct TestApp {
    router: Router,
    analyzer: Arc<StubAnalyzer>,
    store: ArtifactStore,
    _root: TempDir,
}

impl TestApp {
    fn spawn(make_reply: impl FnOnce(&ArtifactStore) -> Reply) -> Self {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(root.path());
        let analyzer = Arc::new(StubAnalyzer {
            reply: make_reply(&store),
            seen: Mutex::new(Vec::new()),
        });
        let router = create_router(AppState::new(analyzer.clone(), store.clone()));
        TestApp {
            router,
            analyzer,
            store,
            _root: root,
        }
    }

    async fn post_analyze(&self, body: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn send(&self, method: &str, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    fn seen(&self) -> Vec<AnalysisRequest> {
        self.analyzer.seen.lock().unwrap().clone()
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_str<'a>(response: &'a Response, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

fn stored_dir(root: &Path, id: &str) -> PathBuf {
    root.join(id)
}

#[tokio::test]
async fn plain_result_is_wrapped_in_json() {
    let app = TestApp::spawn(|_| Reply::Json(json!("42")));

    let response = app
        .post_analyze(r#"{"code": "C", "params": {}, "format": "text"}"#)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"result": "42"}));
}

#[tokio::test]
async fn analysis_error_becomes_500_with_message() {
    let app = TestApp::spawn(|_| Reply::Fail("boom"));

    let response = app
        .post_analyze(r#"{"code": "C", "params": {}, "format": "json"}"#)
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({"error": "boom"}));
}

#[tokio::test]
async fn file_outcome_is_downloaded() {
    let app = TestApp::spawn(|store| Reply::PdfIn(store.clone()));

    let response = app
        .post_analyze(r#"{"code": "X", "params": {}, "format": "pdf"}"#)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), "application/pdf");
    assert_eq!(
        header_str(&response, "content-disposition"),
        "attachment; filename=\"report_X.pdf\""
    );
    let id = header_str(&response, "x-report-id").to_string();
    assert!(stored_dir(app.store.root(), &id).join("report_X.pdf").is_file());

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn file_like_string_stays_json() {
    let app = TestApp::spawn(|_| Reply::Json(json!("report_X.pdf")));

    let response = app
        .post_analyze(r#"{"code": "X", "params": {}, "format": "pdf"}"#)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), "application/json");
    assert_eq!(body_json(response).await, json!({"result": "report_X.pdf"}));
}

#[tokio::test]
async fn missing_fields_still_reach_analyzer() {
    let app = TestApp::spawn(|_| Reply::Json(json!(null)));

    let response = app.post_analyze(r#"{"code": "only-code"}"#).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"result": null}));

    let seen = app.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].code, "only-code");
    assert!(seen[0].params.is_null());
    assert_eq!(seen[0].format, "");
}

#[tokio::test]
async fn body_without_content_type_is_empty_request() {
    let app = TestApp::spawn(|_| Reply::Json(json!("ok")));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze")
                .body(Body::from("code=C"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.seen(), vec![AnalysisRequest::default()]);
}

#[tokio::test]
async fn malformed_json_is_rejected_without_analysis() {
    let app = TestApp::spawn(|_| Reply::Json(json!("ok")));

    let response = app.post_analyze("{not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
    assert!(app.seen().is_empty());
}

#[tokio::test]
async fn stored_report_can_be_fetched_then_deleted() {
    let app = TestApp::spawn(|store| Reply::PdfIn(store.clone()));

    let response = app
        .post_analyze(r#"{"code": "X", "params": {}, "format": "pdf"}"#)
        .await;
    let id = header_str(&response, "x-report-id").to_string();
    let original = body_bytes(response).await;

    let response = app.send("GET", &format!("/reports/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, original);

    let response = app.send("DELETE", &format!("/reports/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!stored_dir(app.store.root(), &id).exists());

    let response = app.send("GET", &format!("/reports/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());

    let response = app.send("DELETE", &format!("/reports/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_report_id_is_json_400() {
    let app = TestApp::spawn(|_| Reply::Json(json!(null)));

    for method in ["GET", "DELETE"] {
        let response = app.send(method, "/reports/not-a-uuid").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(header_str(&response, "content-type"), "application/json");
        assert!(body_json(response).await["error"].is_string());
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::spawn(|_| Reply::Json(json!(null)));

    let response = app.send("GET", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "analysis-service");
}
