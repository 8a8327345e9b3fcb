//! Shared test doubles for router tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uptick_axum::{CorePorts, CorsConfig, bootstrap_with, create_router};
use uptick_core::{
    CompletionRequest, LanguageModelPort, ProviderError, Settings, SpeechSynthesisPort,
    SynthesisRequest, SystemClock,
};

pub const REPORT_JSON: &str = r#"{
    "vocabulary": { "score": 82, "feedback": "Broad range" },
    "grammar": { "score": 74, "feedback": "Minor tense slips" },
    "fluency": { "score": 88, "feedback": "Natural pace" },
    "overall": { "level": "Upper-Intermediate", "summary": "Confident speaker" }
}"#;

/// Answers chat calls with a fixed line and assessment calls with a report.
pub struct StubModel {
    pub reply: Option<String>,
    pub report: Option<String>,
    pub calls: AtomicUsize,
}

impl StubModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            report: Some(REPORT_JSON.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            report: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LanguageModelPort for StubModel {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = if request.max_tokens == 1000 {
            &self.report
        } else {
            &self.reply
        };
        answer.clone().map(Some).ok_or_else(|| ProviderError::Status {
            status: 500,
            message: "upstream down".to_string(),
        })
    }
}

/// Returns the text as "audio", or fails every call.
pub struct StubSpeech {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubSpeech {
    pub const fn working() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub const fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechSynthesisPort for StubSpeech {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Bytes, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Network("connection refused".to_string()));
        }
        Ok(Bytes::from(format!("mp3:{}", request.text)))
    }
}

/// Router wired to the given stubs.
pub fn app(model: Arc<StubModel>, speech: Arc<StubSpeech>) -> Router {
    let ctx = bootstrap_with(
        Settings::default(),
        CorePorts {
            model,
            speech,
            clock: Arc::new(SystemClock),
        },
    )
    .unwrap();
    create_router(ctx, &CorsConfig::AllowAll)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
