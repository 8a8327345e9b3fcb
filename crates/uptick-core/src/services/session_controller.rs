//! Session controller: the three-screen assessment state machine.
//!
//! ```text
//!   Hero ──start──► Conversation ──finish──► Assessment ──reset──► Hero
//!                    │  ▲                      │  ▲
//!                    └──┘ utterance/reply      └──┘ retry (after failure)
//! ```
//!
//! # Concurrency
//!
//! - State lives behind a `std::sync::Mutex` that is never held across an
//!   `.await`.
//! - Each run (start → reset) gets a fresh generation number and
//!   cancellation token. Async work captures both and drops its result if
//!   the run was superseded.
//! - The transition out of `Conversation` is guarded by a single-shot latch,
//!   so the timer, a closing phrase and the user can race to finish and only
//!   one assessment request is issued.
//! - Model and assessment calls run on spawned tasks that own the busy flags.
//!   A caller that stops waiting (client disconnect, request timeout) does
//!   not leave the session stuck; the task still lands its result.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::assessor::Assessor;
use super::closing::ClosingDetector;
use super::responder::{ConversationResponder, OPENING_LINE};
use super::timer::{SessionTimer, TickOutcome, elapsed_minutes};
use crate::domain::{
    AssessmentReport, ChatMessage, ConversationTurn, EndTrigger, Preferences, PreferencesUpdate, Screen,
    SessionId, SessionSnapshot, to_chat_messages,
};
use crate::events::SessionEvent;
use crate::ports::{Clock, SessionEventEmitter};
use crate::settings::Settings;

/// Errors from session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The operation is not valid on the current screen.
    #[error("Operation not allowed on the {current} screen")]
    WrongScreen { current: Screen },

    /// Another operation holds the session.
    #[error("Session is busy: {0}")]
    Busy(&'static str),

    /// The session was reset or removed while the operation was in flight.
    #[error("Session was restarted while the operation was in flight")]
    Superseded,

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Utterance text is empty")]
    EmptyUtterance,

    /// The background task driving the operation died.
    #[error("Session task failed: {0}")]
    TaskFailed(String),
}

/// Timing configuration for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub limit_minutes: u32,
    pub tick_interval: Duration,
    pub closing_delay: Duration,
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            limit_minutes: settings.session_limit_minutes,
            tick_interval: settings.tick_interval(),
            closing_delay: settings.closing_delay(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct SessionServices {
    pub responder: Arc<ConversationResponder>,
    pub assessor: Arc<Assessor>,
    pub closing: Arc<dyn ClosingDetector>,
    pub clock: Arc<dyn Clock>,
    pub events: Arc<dyn SessionEventEmitter>,
}

/// Result of a submitted utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtteranceOutcome {
    /// Teacher reply (possibly the fallback line).
    pub reply: String,
    /// Whether the reply ended the conversation.
    pub closing: bool,
    pub snapshot: SessionSnapshot,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default)]
struct SessionState {
    screen: Screen,
    start_time: Option<DateTime<Utc>>,
    elapsed_minutes: u32,
    topics_covered: Vec<String>,
    conversation: Vec<ConversationTurn>,
    assessment: Option<AssessmentReport>,
    assessment_error: Option<String>,
    is_recording: bool,
    is_speaking: bool,
    is_generating_response: bool,
    is_finishing_conversation: bool,
    preferences: Preferences,
}

impl SessionState {
    fn fresh(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }
}

/// One assessment session.
pub struct SessionController {
    id: SessionId,
    state: Mutex<SessionState>,
    generation: AtomicU64,
    run_token: Mutex<CancellationToken>,
    ending: AtomicBool,
    /// Last client interaction, for idle eviction.
    last_active: Mutex<Instant>,
    services: SessionServices,
    config: SessionConfig,
}

impl SessionController {
    pub fn new(
        id: SessionId,
        services: SessionServices,
        config: SessionConfig,
        preferences: Preferences,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            state: Mutex::new(SessionState::fresh(preferences)),
            generation: AtomicU64::new(0),
            run_token: Mutex::new(CancellationToken::new()),
            ending: AtomicBool::new(false),
            last_active: Mutex::new(Instant::now()),
            services,
            config,
        })
    }

    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Current run generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Record client activity.
    pub fn touch(&self) {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Time since the last client activity.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    // ── Transitions ────────────────────────────────────────────────

    /// Hero → conversation: open with the fixed teacher line and start the timer.
    pub fn start(self: &Arc<Self>) -> Result<SessionSnapshot, SessionError> {
        let (token, fast_mode) = {
            let mut state = self.lock_state();
            if state.screen != Screen::Hero {
                return Err(SessionError::WrongScreen {
                    current: state.screen,
                });
            }

            let token = self.begin_run();
            *state = SessionState::fresh(state.preferences);
            state.screen = Screen::Conversation;
            state.start_time = Some(self.services.clock.now());
            state.conversation.push(ConversationTurn::teacher(OPENING_LINE));
            state.is_speaking = true;
            (token, state.preferences.fast_mode)
        };

        tracing::info!(session_id = %self.id, "Conversation started");
        self.emit(SessionEvent::ScreenChanged {
            screen: Screen::Conversation,
        });
        self.emit(SessionEvent::TurnAdded {
            turn: ConversationTurn::teacher(OPENING_LINE),
        });
        self.emit(SessionEvent::Speak {
            text: OPENING_LINE.to_string(),
            fast_mode,
        });

        SessionTimer::spawn(Arc::downgrade(self), self.config.tick_interval, token);

        Ok(self.snapshot())
    }

    /// Mark the microphone as capturing.
    pub fn begin_recording(&self) -> Result<SessionSnapshot, SessionError> {
        {
            let mut state = self.lock_state();
            self.require_open_conversation(&state)?;
            if state.is_recording {
                return Err(SessionError::Busy("already recording"));
            }
            if state.is_speaking {
                return Err(SessionError::Busy("teacher is speaking"));
            }
            if state.is_generating_response {
                return Err(SessionError::Busy("teacher is thinking"));
            }
            state.is_recording = true;
        }
        Ok(self.snapshot())
    }

    /// Recognizer failed or was aborted: clear the recording flag.
    pub fn cancel_recording(&self) -> SessionSnapshot {
        self.lock_state().is_recording = false;
        self.snapshot()
    }

    /// Append a transcribed user turn and fetch the teacher's reply.
    pub async fn submit_utterance(
        self: &Arc<Self>,
        text: &str,
    ) -> Result<UtteranceOutcome, SessionError> {
        let text = text.trim();

        let (history, topics, elapsed, generation, token) = {
            let mut state = self.lock_state();
            if text.is_empty() {
                state.is_recording = false;
                return Err(SessionError::EmptyUtterance);
            }
            self.require_open_conversation(&state)?;
            if state.is_generating_response {
                return Err(SessionError::Busy("teacher is thinking"));
            }
            if state.is_speaking {
                return Err(SessionError::Busy("teacher is speaking"));
            }

            state.is_recording = false;
            state.conversation.push(ConversationTurn::user(text));
            state.is_generating_response = true;

            (
                to_chat_messages(&state.conversation),
                state.topics_covered.clone(),
                state.elapsed_minutes,
                self.generation(),
                self.current_token(),
            )
        };

        self.emit(SessionEvent::TurnAdded {
            turn: ConversationTurn::user(text),
        });

        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            controller
                .complete_reply(history, topics, elapsed, generation, token)
                .await
        });
        join(task).await
    }

    /// Fetch the teacher reply and apply it to the run that asked for it.
    async fn complete_reply(
        self: Arc<Self>,
        history: Vec<ChatMessage>,
        topics: Vec<String>,
        elapsed: u32,
        generation: u64,
        token: CancellationToken,
    ) -> Result<UtteranceOutcome, SessionError> {
        let reply = tokio::select! {
            () = token.cancelled() => return Err(SessionError::Superseded),
            reply = self.services.responder.respond_or_fallback(&history, &topics, elapsed) => reply,
        };

        let closing = self.services.closing.should_end(&reply);
        let fast_mode = {
            let mut state = self.lock_state();
            if self.generation() != generation {
                return Err(SessionError::Superseded);
            }
            state.is_generating_response = false;
            if state.screen != Screen::Conversation || self.ending.load(Ordering::SeqCst) {
                // The conversation ended while the reply was in flight.
                return Err(SessionError::Superseded);
            }
            state.conversation.push(ConversationTurn::teacher(reply.clone()));
            state.is_speaking = true;
            state.preferences.fast_mode
        };

        self.emit(SessionEvent::TurnAdded {
            turn: ConversationTurn::teacher(reply.clone()),
        });
        self.emit(SessionEvent::Speak {
            text: reply.clone(),
            fast_mode,
        });

        if closing {
            tracing::info!(session_id = %self.id, "Closing phrase detected");
            self.schedule_finish(token);
        }

        Ok(UtteranceOutcome {
            reply,
            closing,
            snapshot: self.snapshot(),
        })
    }

    /// Client finished playing the current teacher line.
    pub fn speaking_finished(&self) -> SessionSnapshot {
        self.lock_state().is_speaking = false;
        self.snapshot()
    }

    /// Conversation → assessment.
    ///
    /// Safe to call any number of times concurrently: only the first caller
    /// requests the assessment, the rest return the current snapshot.
    pub async fn finish(self: &Arc<Self>, trigger: EndTrigger) -> Result<SessionSnapshot, SessionError> {
        let (conversation, generation, token) = {
            let mut state = self.lock_state();
            let screen = state.screen;
            match screen {
                Screen::Hero => {
                    return Err(SessionError::WrongScreen {
                        current: Screen::Hero,
                    });
                }
                Screen::Assessment => {
                    drop(state);
                    return Ok(self.snapshot());
                }
                Screen::Conversation => {}
            }

            if self
                .ending
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                drop(state);
                return Ok(self.snapshot());
            }

            state.is_recording = false;
            state.is_finishing_conversation = true;
            (
                state.conversation.clone(),
                self.generation(),
                self.current_token(),
            )
        };

        tracing::info!(session_id = %self.id, ?trigger, "Conversation ending");
        self.emit(SessionEvent::Ending { trigger });

        join(self.spawn_assessment(conversation, generation, token)).await?;
        Ok(self.snapshot())
    }

    /// Re-run a failed assessment on the same dialogue.
    pub async fn retry_assessment(self: &Arc<Self>) -> Result<SessionSnapshot, SessionError> {
        let (conversation, generation, token) = {
            let mut state = self.lock_state();
            if state.screen != Screen::Assessment {
                return Err(SessionError::WrongScreen {
                    current: state.screen,
                });
            }
            if state.is_finishing_conversation {
                return Err(SessionError::Busy("assessment in progress"));
            }
            if state.assessment_error.is_none() {
                return Err(SessionError::Busy("assessment already available"));
            }
            state.assessment_error = None;
            state.is_finishing_conversation = true;
            (
                state.conversation.clone(),
                self.generation(),
                self.current_token(),
            )
        };

        tracing::info!(session_id = %self.id, "Retrying assessment");
        join(self.spawn_assessment(conversation, generation, token)).await?;
        Ok(self.snapshot())
    }

    /// Back to hero with everything cleared except preferences.
    ///
    /// In-flight work of the previous run is cancelled and its results are
    /// discarded.
    pub fn reset(&self) -> SessionSnapshot {
        {
            let mut state = self.lock_state();
            self.begin_run();
            *state = SessionState::fresh(state.preferences);
        }

        tracing::info!(session_id = %self.id, "Session reset");
        self.emit(SessionEvent::SessionReset);
        self.emit(SessionEvent::ScreenChanged {
            screen: Screen::Hero,
        });
        self.snapshot()
    }

    pub fn set_preferences(&self, update: PreferencesUpdate) -> SessionSnapshot {
        self.lock_state().preferences.merge(update);
        self.snapshot()
    }

    /// Recompute elapsed minutes and end the session at the limit.
    pub async fn tick(self: &Arc<Self>) -> TickOutcome {
        let (changed, reached_limit) = {
            let mut state = self.lock_state();
            if state.screen != Screen::Conversation || self.ending.load(Ordering::SeqCst) {
                return TickOutcome::Stop;
            }
            let Some(start) = state.start_time else {
                return TickOutcome::Stop;
            };

            let minutes = elapsed_minutes(start, self.services.clock.now());
            let changed = minutes != state.elapsed_minutes;
            state.elapsed_minutes = minutes;
            (changed.then_some(minutes), minutes >= self.config.limit_minutes)
        };

        if let Some(minutes) = changed {
            self.emit(SessionEvent::Elapsed { minutes });
        }

        if !reached_limit {
            return TickOutcome::Continue;
        }

        tracing::info!(session_id = %self.id, "Session time limit reached");
        if let Err(e) = self.finish(EndTrigger::TimeLimit).await {
            tracing::debug!(session_id = %self.id, error = %e, "Timed finish discarded");
        }
        TickOutcome::Stop
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        SessionSnapshot {
            session_id: self.id,
            screen: state.screen,
            start_time: state.start_time,
            elapsed_minutes: state.elapsed_minutes,
            topics_covered: state.topics_covered.clone(),
            conversation: state.conversation.clone(),
            assessment: state.assessment.clone(),
            assessment_error: state.assessment_error.clone(),
            is_recording: state.is_recording,
            is_speaking: state.is_speaking,
            is_generating_response: state.is_generating_response,
            is_finishing_conversation: state.is_finishing_conversation,
            fast_mode: state.preferences.fast_mode,
            show_transcription: state.preferences.show_transcription,
        }
    }

    /// Cancel the current run's timer and in-flight calls.
    pub fn shutdown(&self) {
        self.current_token().cancel();
        tracing::debug!(session_id = %self.id, "Session shut down");
    }

    // ── Internals ──────────────────────────────────────────────────

    fn spawn_assessment(
        self: &Arc<Self>,
        conversation: Vec<ConversationTurn>,
        generation: u64,
        token: CancellationToken,
    ) -> JoinHandle<Result<(), SessionError>> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller
                .run_assessment(&conversation, generation, &token)
                .await
        })
    }

    async fn run_assessment(
        &self,
        conversation: &[ConversationTurn],
        generation: u64,
        token: &CancellationToken,
    ) -> Result<(), SessionError> {
        let result = tokio::select! {
            () = token.cancelled() => return Err(SessionError::Superseded),
            result = self.services.assessor.assess(conversation) => result,
        };

        let event = {
            let mut state = self.lock_state();
            if self.generation() != generation {
                return Err(SessionError::Superseded);
            }
            state.is_finishing_conversation = false;
            state.screen = Screen::Assessment;
            match result {
                Ok(report) => {
                    state.assessment = Some(report.clone());
                    state.assessment_error = None;
                    SessionEvent::AssessmentReady { report }
                }
                Err(e) => {
                    tracing::warn!(session_id = %self.id, error = %e, "Assessment failed");
                    let error = e.to_string();
                    state.assessment_error = Some(error.clone());
                    SessionEvent::AssessmentFailed { error }
                }
            }
        };

        self.emit(SessionEvent::ScreenChanged {
            screen: Screen::Assessment,
        });
        self.emit(event);
        Ok(())
    }

    /// Finish after the closing delay unless the run is cancelled first.
    fn schedule_finish(self: &Arc<Self>, token: CancellationToken) {
        let controller = Arc::clone(self);
        let delay = self.config.closing_delay;
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    if let Err(e) = controller.finish(EndTrigger::ClosingPhrase).await {
                        tracing::debug!(session_id = %controller.id, error = %e, "Closing finish discarded");
                    }
                }
            }
        });
    }

    /// Start a new run: bump the generation, cancel the old token, rearm the
    /// latch. Caller holds the state lock.
    fn begin_run(&self) -> CancellationToken {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.ending.store(false, Ordering::SeqCst);
        let fresh = CancellationToken::new();
        let mut current = self
            .run_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = fresh.clone();
        fresh
    }

    fn require_open_conversation(&self, state: &SessionState) -> Result<(), SessionError> {
        if state.screen != Screen::Conversation {
            return Err(SessionError::WrongScreen {
                current: state.screen,
            });
        }
        if self.ending.load(Ordering::SeqCst) {
            return Err(SessionError::Busy("conversation is ending"));
        }
        Ok(())
    }

    fn current_token(&self) -> CancellationToken {
        self.run_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        self.services.events.emit(self.id, event);
    }
}

/// Await a detached session task, surfacing a panic as an error.
async fn join<T>(task: JoinHandle<Result<T, SessionError>>) -> Result<T, SessionError> {
    task.await
        .unwrap_or_else(|e| Err(SessionError::TaskFailed(e.to_string())))
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
