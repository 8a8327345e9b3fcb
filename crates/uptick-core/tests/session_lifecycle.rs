//! End-to-end session flow against stub ports.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use uptick_core::services::{
    AssessorConfig, CacheStatus, GatewayConfig, OPENING_LINE, ResponderConfig, SessionConfig,
};
use uptick_core::{
    Assessor, ChannelEmitter, CompletionRequest, ConversationResponder, EndTrigger,
    LanguageModelPort, ManualClock, PhraseClosingDetector, Preferences, ProficiencyLevel,
    ProviderError, Screen, SessionEvent, SessionRegistry, SessionServices, SpeechGateway,
    SpeechSynthesisPort, SynthesisRequest,
};

const REPORT: &str = r#"{
    "vocabulary": { "score": 100, "feedback": "Excellent" },
    "grammar": { "score": 100, "feedback": "Flawless" },
    "fluency": { "score": 100, "feedback": "Native-like" },
    "overall": { "level": "Advanced", "summary": "Outstanding" }
}"#;

/// Replays chat replies in order and records every request.
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(ToString::to_string).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn assessment_requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.max_tokens == 1000)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LanguageModelPort for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, ProviderError> {
        let is_assessment = request.max_tokens == 1000;
        self.requests.lock().unwrap().push(request);
        if is_assessment {
            return Ok(Some(REPORT.to_string()));
        }
        Ok(self.replies.lock().unwrap().pop_front())
    }
}

#[derive(Default)]
struct CountingSynth {
    calls: AtomicUsize,
}

#[async_trait]
impl SpeechSynthesisPort for CountingSynth {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Bytes, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Bytes::from(request.text.into_bytes()))
    }
}

#[tokio::test]
async fn full_session_from_hero_to_report_and_back() {
    let model = Arc::new(ScriptedModel::new(&[
        "Nice to meet you, Ana! What do you do for work?",
        "Thank you for sharing so much with me! I think I have a good sense of your English level now.",
    ]));
    let (emitter, mut events) = ChannelEmitter::new();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
    ));

    let services = SessionServices {
        responder: Arc::new(ConversationResponder::new(
            model.clone(),
            ResponderConfig::default(),
        )),
        assessor: Arc::new(Assessor::new(model.clone(), AssessorConfig::default())),
        closing: Arc::new(PhraseClosingDetector::default()),
        clock,
        events: Arc::new(emitter),
    };
    let registry = SessionRegistry::new(services, SessionConfig::default());

    let session = registry.create(Preferences::default());
    let id = session.id();

    session.start().unwrap();
    session.speaking_finished();
    session.begin_recording().unwrap();
    let first = session
        .submit_utterance("My name is Ana and I am from Spain")
        .await
        .unwrap();
    assert!(!first.closing);

    session.speaking_finished();
    let second = session.submit_utterance("I work as a nurse").await.unwrap();
    assert!(second.closing);

    // Closing delay and the user racing to finish: one assessment
    let snapshot = session.finish(EndTrigger::UserAction).await.unwrap();
    assert_eq!(snapshot.screen, Screen::Assessment);

    let report = snapshot.assessment.expect("report");
    assert_eq!(report.overall.level, ProficiencyLevel::Advanced);
    assert_eq!(report.vocabulary.score, 100);

    let assessments = model.assessment_requests();
    assert_eq!(assessments.len(), 1);
    let prompt = &assessments[0].messages[1].content;
    assert!(prompt.contains("My name is Ana and I am from Spain I work as a nurse"));
    assert!(!prompt.contains(OPENING_LINE));

    let reset = registry.get(id).unwrap().reset();
    assert_eq!(reset.screen, Screen::Hero);
    assert!(reset.conversation.is_empty());

    let mut kinds = Vec::new();
    while let Ok(envelope) = events.try_recv() {
        assert_eq!(envelope.session_id, id);
        kinds.push(envelope.event);
    }
    assert!(matches!(
        kinds.first(),
        Some(SessionEvent::ScreenChanged {
            screen: Screen::Conversation
        })
    ));
    assert!(kinds.iter().any(|e| matches!(
        e,
        SessionEvent::Ending {
            trigger: EndTrigger::UserAction
        }
    )));
    assert!(kinds
        .iter()
        .any(|e| matches!(e, SessionEvent::AssessmentReady { .. })));
    assert_eq!(kinds.last(), Some(&SessionEvent::ScreenChanged { screen: Screen::Hero }));

    registry.remove(id).unwrap();
    assert!(registry.is_empty());
}

#[tokio::test]
async fn gateway_cache_is_shared_and_bounded() {
    let synth = Arc::new(CountingSynth::default());
    let gateway = SpeechGateway::new(
        synth.clone(),
        GatewayConfig {
            seed_phrases: Vec::new(),
            ..GatewayConfig::default()
        },
    );

    for i in 0..51 {
        let outcome = gateway.synthesize(&format!("Line {i}"), true).await.unwrap();
        assert_eq!(outcome.cache, CacheStatus::Miss);
    }
    assert_eq!(gateway.cached_len(), 50);
    assert!(gateway.cached("Line 0").is_none());

    let hit = gateway.synthesize("Line 50", false).await.unwrap();
    assert_eq!(hit.cache, CacheStatus::Hit);
    assert_eq!(hit.audio, Bytes::from_static(b"Line 50"));
    assert_eq!(synth.calls.load(Ordering::SeqCst), 51);
}
