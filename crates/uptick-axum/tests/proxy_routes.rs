//! Router tests for the stateless `/tts`, `/chat` and `/assess` endpoints.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use common::{StubModel, StubSpeech, app, body_bytes, body_json, post_json, send};

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let app = app(Arc::new(StubModel::new("hi")), Arc::new(StubSpeech::working()));
    let response = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"OK");
}

#[tokio::test]
async fn tts_miss_then_hit_with_headers() {
    let speech = Arc::new(StubSpeech::working());
    let app = app(Arc::new(StubModel::new("hi")), speech.clone());
    let body = json!({ "text": "Nice to meet you!", "useFastMode": true });

    let first = send(&app, post_json("/api/tts", &body)).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["content-type"], "audio/mpeg");
    assert_eq!(first.headers()["x-cache"], "MISS");
    assert_eq!(first.headers()["content-length"], "21");
    let first_audio = body_bytes(first).await;

    // Root alias shares the same gateway
    let second = send(&app, post_json("/tts", &body)).await;
    assert_eq!(second.headers()["x-cache"], "HIT");
    assert_eq!(body_bytes(second).await, first_audio);
}

#[tokio::test]
async fn tts_requires_text() {
    let app = app(Arc::new(StubModel::new("hi")), Arc::new(StubSpeech::working()));

    for body in [json!({}), json!({ "text": "" }), json!({ "text": 42 })] {
        let response = send(&app, post_json("/api/tts", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Text is required");
        assert_eq!(json["status"], 400);
        assert!(json.get("fallback").is_none());
    }
}

#[tokio::test]
async fn tts_failure_signals_fallback() {
    let speech = Arc::new(StubSpeech::failing());
    let app = app(Arc::new(StubModel::new("hi")), speech);

    let response = send(&app, post_json("/api/tts", &json!({ "text": "Hello" }))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to generate speech");
    assert_eq!(json["fallback"], true);
}

#[tokio::test]
async fn chat_returns_teacher_line() {
    let model = Arc::new(StubModel::new("What do you do for work?"));
    let app = app(model.clone(), Arc::new(StubSpeech::working()));

    let body = json!({
        "messages": [
            { "role": "assistant", "content": "Tell me about yourself" },
            { "role": "user", "content": "I am Ana" }
        ],
        "topicsCovered": [],
        "timeElapsed": 2
    });
    let response = send(&app, post_json("/chat", &body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "response": "What do you do for work?" })
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn chat_validation_and_failure() {
    let app = app(Arc::new(StubModel::failing()), Arc::new(StubSpeech::working()));

    let missing = send(&app, post_json("/api/chat", &json!({ "messages": "hi" }))).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], "Messages array is required");

    let failed = send(&app, post_json("/api/chat", &json!({ "messages": [] }))).await;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(failed).await["error"], "Failed to generate response");
}

#[tokio::test]
async fn assess_returns_report() {
    let app = app(Arc::new(StubModel::new("hi")), Arc::new(StubSpeech::working()));
    let body = json!({
        "conversation": [
            { "speaker": "teacher", "text": "Hi" },
            { "speaker": "user", "text": "I am from Spain" }
        ]
    });

    let response = send(&app, post_json("/api/assess", &body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["overall"]["level"], "Upper-Intermediate");
    assert_eq!(json["fluency"]["score"], 88);
}

#[tokio::test]
async fn assess_validation_and_failure() {
    let app = app(Arc::new(StubModel::failing()), Arc::new(StubSpeech::working()));

    let missing = send(&app, post_json("/assess", &json!({}))).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(missing).await["error"],
        "Conversation array is required"
    );

    let failed = send(&app, post_json("/assess", &json!({ "conversation": [] }))).await;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(failed).await["error"],
        "Failed to generate assessment"
    );
}
