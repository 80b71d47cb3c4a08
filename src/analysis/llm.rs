use std::time::Instant;

use chrono::Utc;
use opentelemetry::KeyValue;

use super::params::AnalysisParams;
use super::{AnalysisOutcome, AnalysisRequest, Analyzer, prompt};
use crate::config::Config;
use crate::llm::{GenerateRequest, LlmClient};
use crate::reports::{ArtifactStore, JsonReport, ReportFormat, ReportMeta, write_report};
use crate::telemetry::metrics::{ANALYSIS_DURATION, ANALYSIS_ERRORS, REPORTS_GENERATED};

/// Default analysis routine: asks the configured LLM for an analysis of the
/// request and renders it in the requested format.
pub struct LlmAnalyzer {
    client: LlmClient,
    store: ArtifactStore,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmAnalyzer {
    pub fn new(client: LlmClient, store: ArtifactStore, model: impl Into<String>) -> Self {
        Self {
            client,
            store,
            model: model.into(),
            temperature: 0.2,
            max_tokens: 400,
        }
    }

    pub fn from_config(config: &Config, client: LlmClient, store: ArtifactStore) -> Self {
        Self::new(client, store, config.llm_model.clone())
            .with_sampling(config.llm_temperature, config.llm_max_tokens)
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    #[tracing::instrument(
        name = "analysis run",
        skip(self, request),
        fields(
            analysis.code = %request.code,
            analysis.format = %request.format,
            analysis.lang,
            report.id,
        )
    )]
    async fn run(&self, request: &AnalysisRequest) -> anyhow::Result<AnalysisOutcome> {
        let format: ReportFormat = request.format.parse()?;
        let params = AnalysisParams::from_value(&request.params);

        let span = tracing::Span::current();
        span.record("analysis.lang", params.lang.as_str());

        let resp = self
            .client
            .generate(&GenerateRequest {
                model: self.model.clone(),
                system: prompt::system_prompt(params.lang),
                prompt: prompt::user_prompt(&request.code, format, &params),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            })
            .await?;

        if resp.content.is_empty() {
            anyhow::bail!("analysis for code {:?} returned no text", request.code);
        }
        let text = resp.content;

        let mut meta = ReportMeta::new(format!("Analysis report {}", request.code), &request.code)
            .with("lang", params.lang.as_str())
            .with("generated_at", Utc::now().to_rfc3339());
        if let Some(period) = &params.period {
            meta = meta.with("period", period.as_str());
        }

        let outcome = match format {
            ReportFormat::Text => AnalysisOutcome::Json(serde_json::Value::String(text)),
            ReportFormat::Json => AnalysisOutcome::Json(JsonReport::new(&text, &meta).to_value()?),
            ReportFormat::Pdf | ReportFormat::Xlsx | ReportFormat::Docx => {
                let artifact = self
                    .store
                    .create(format, move |dir| write_report(format, &text, &meta, dir))
                    .await?;

                span.record("report.id", artifact.id.to_string());
                tracing::info!(
                    report.id = %artifact.id,
                    path = %artifact.path.display(),
                    "Report written"
                );

                AnalysisOutcome::File(artifact)
            }
        };

        REPORTS_GENERATED.add(1, &[KeyValue::new("report.format", format.as_str())]);

        Ok(outcome)
    }
}

#[async_trait::async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> anyhow::Result<AnalysisOutcome> {
        let start = Instant::now();
        let result = self.run(request).await;

        ANALYSIS_DURATION.record(start.elapsed().as_secs_f64(), &[]);
        if result.is_err() {
            ANALYSIS_ERRORS.add(1, &[]);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::llm::{GenerateResponse, Provider};
    use serde_json::json;

    /// Replies with a fixed text and remembers the last request it saw.
    struct EchoProvider {
        reply: String,
        seen: Mutex<Option<GenerateRequest>>,
    }

    #[async_trait::async_trait]
    impl Provider for EchoProvider {
        async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            *self.seen.lock().unwrap() = Some(req.clone());
            Ok(GenerateResponse {
                content: self.reply.clone(),
                model: req.model.clone(),
                input_tokens: 1,
                output_tokens: 1,
                finish_reason: "stop".to_string(),
            })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn analyzer(reply: &str, root: &std::path::Path) -> (LlmAnalyzer, Arc<EchoProvider>) {
        let provider = Arc::new(EchoProvider {
            reply: reply.to_string(),
            seen: Mutex::new(None),
        });
        let analyzer = LlmAnalyzer::new(
            LlmClient::new(provider.clone()),
            ArtifactStore::new(root),
            "test-model",
        );
        (analyzer, provider)
    }

    fn request(code: &str, format: &str, params: serde_json::Value) -> AnalysisRequest {
        AnalysisRequest {
            code: code.to_string(),
            params,
            format: format.to_string(),
        }
    }

    #[tokio::test]
    async fn test_text_format_returns_plain_value() {
        let root = tempfile::tempdir().unwrap();
        let (analyzer, _) = analyzer("42", root.path());

        let outcome = analyzer
            .analyze(&request("C", "text", json!(null)))
            .await
            .unwrap();

        assert_eq!(outcome, AnalysisOutcome::Json(json!("42")));
    }

    #[tokio::test]
    async fn test_json_format_wraps_meta_and_analysis() {
        let root = tempfile::tempdir().unwrap();
        let (analyzer, _) = analyzer("Liquidity is fine.", root.path());

        let outcome = analyzer
            .analyze(&request("liq", "json", json!({"lang": "en", "period": "2024"})))
            .await
            .unwrap();

        let AnalysisOutcome::Json(value) = outcome else {
            panic!("expected JSON outcome");
        };
        assert_eq!(value["analysis"], "Liquidity is fine.");
        assert_eq!(value["meta"]["code"], "liq");
        assert_eq!(value["meta"]["title"], "Analysis report liq");
        assert_eq!(value["meta"]["lang"], "en");
        assert_eq!(value["meta"]["period"], "2024");
        assert!(value["meta"]["generated_at"].is_string());
    }

    #[tokio::test]
    async fn test_file_format_writes_into_store() {
        let root = tempfile::tempdir().unwrap();
        let (analyzer, _) = analyzer("line one\nline two", root.path());

        let outcome = analyzer
            .analyze(&request("X", "pdf", json!({})))
            .await
            .unwrap();

        let AnalysisOutcome::File(artifact) = outcome else {
            panic!("expected file outcome");
        };
        assert_eq!(artifact.format, ReportFormat::Pdf);
        assert_eq!(artifact.file_name(), "report_X.pdf");
        assert_eq!(
            artifact.path,
            root.path().join(artifact.id.to_string()).join("report_X.pdf")
        );
        assert!(artifact.path.is_file());
    }

    #[tokio::test]
    async fn test_same_code_gets_separate_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let (analyzer, _) = analyzer("text", root.path());

        let a = analyzer.analyze(&request("C", "docx", json!({}))).await.unwrap();
        let b = analyzer.analyze(&request("C", "docx", json!({}))).await.unwrap();

        match (a, b) {
            (AnalysisOutcome::File(a), AnalysisOutcome::File(b)) => {
                assert_ne!(a.path, b.path);
                assert!(a.path.is_file());
                assert!(b.path.is_file());
            }
            other => panic!("expected two files, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prompt_built_from_params() {
        let root = tempfile::tempdir().unwrap();
        let (analyzer, provider) = analyzer("ok", root.path());

        analyzer
            .analyze(&request(
                "pnl",
                "",
                json!({"lang": "en", "period": "Q1", "content": "revenue 10"}),
            ))
            .await
            .unwrap();

        let seen = provider.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.model, "test-model");
        assert!(seen.system.contains("English"));
        assert_eq!(
            seen.prompt,
            "Data:\nrevenue 10\n\nAnalyze by code: pnl, format: json, period: Q1"
        );
    }

    #[tokio::test]
    async fn test_unknown_format_fails_before_llm_call() {
        let root = tempfile::tempdir().unwrap();
        let (analyzer, provider) = analyzer("ok", root.path());

        let err = analyzer
            .analyze(&request("C", "pptx", json!({})))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "unsupported report format: pptx");
        assert!(provider.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_llm_reply_is_error() {
        let root = tempfile::tempdir().unwrap();
        let (analyzer, _) = analyzer("", root.path());

        let err = analyzer
            .analyze(&request("C", "json", json!({})))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("returned no text"));
    }
}
