//! In-memory registry of live sessions.
//!
//! Browsers rarely say goodbye, so sessions nobody has touched for a while
//! are evicted by a periodic sweep.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::session_controller::{SessionConfig, SessionController, SessionError, SessionServices};
use crate::domain::{Preferences, SessionId};

/// Owns every session controller, keyed by id.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<SessionController>>>,
    services: SessionServices,
    config: SessionConfig,
    /// Cancelled by [`shutdown_all`](Self::shutdown_all); stops the sweeper.
    closed: CancellationToken,
}

impl SessionRegistry {
    pub fn new(services: SessionServices, config: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            services,
            config,
            closed: CancellationToken::new(),
        }
    }

    /// Create a session on the hero screen.
    pub fn create(&self, preferences: Preferences) -> Arc<SessionController> {
        let id = Uuid::new_v4();
        let controller =
            SessionController::new(id, self.services.clone(), self.config, preferences);
        self.sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id, Arc::clone(&controller));
        tracing::info!(session_id = %id, "Session created");
        controller
    }

    /// Look up a session and mark it active.
    pub fn get(&self, id: SessionId) -> Result<Arc<SessionController>, SessionError> {
        let session = self
            .sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))?;
        session.touch();
        Ok(session)
    }

    /// Drop a session, cancelling its timer and in-flight calls.
    pub fn remove(&self, id: SessionId) -> Result<(), SessionError> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;
        removed.shutdown();
        tracing::info!(session_id = %id, "Session removed");
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every session idle for at least `max_idle`. Returns how many
    /// were evicted.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let evicted: Vec<_> = {
            let mut sessions = self
                .sessions
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let stale: Vec<SessionId> = sessions
                .iter()
                .filter(|(_, session)| session.idle_for() >= max_idle)
                .map(|(id, _)| *id)
                .collect();
            stale.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &evicted {
            session.shutdown();
            tracing::info!(session_id = %session.id(), "Idle session evicted");
        }
        evicted.len()
    }

    /// Run [`evict_idle`](Self::evict_idle) every `period` until the registry
    /// is shut down or dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration, max_idle: Duration) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        let closed = self.closed.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = closed.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let evicted = registry.evict_idle(max_idle);
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = registry.len(), "Idle sweep");
                }
            }

            tracing::debug!("Session sweeper stopped");
        })
    }

    /// Shut down every session.
    pub fn shutdown_all(&self) {
        self.closed.cancel();
        let sessions: Vec<_> = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .drain()
            .map(|(_, session)| session)
            .collect();
        for session in sessions {
            session.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Screen;
    use crate::ports::language_model::MockLanguageModelPort;
    use crate::ports::{NoopEmitter, SystemClock};
    use crate::services::assessor::{Assessor, AssessorConfig};
    use crate::services::closing::PhraseClosingDetector;
    use crate::services::responder::{ConversationResponder, ResponderConfig};

    fn registry() -> SessionRegistry {
        let model: Arc<dyn crate::ports::LanguageModelPort> =
            Arc::new(MockLanguageModelPort::new());
        let services = SessionServices {
            responder: Arc::new(ConversationResponder::new(
                Arc::clone(&model),
                ResponderConfig::default(),
            )),
            assessor: Arc::new(Assessor::new(model, AssessorConfig::default())),
            closing: Arc::new(PhraseClosingDetector::default()),
            clock: Arc::new(SystemClock),
            events: Arc::new(NoopEmitter::new()),
        };
        SessionRegistry::new(services, SessionConfig::default())
    }

    #[test]
    fn create_get_remove() {
        let registry = registry();
        assert!(registry.is_empty());

        let session = registry.create(Preferences::default());
        assert_eq!(registry.len(), 1);

        let fetched = registry.get(session.id()).unwrap();
        assert_eq!(fetched.snapshot().screen, Screen::Hero);

        registry.remove(session.id()).unwrap();
        assert_eq!(registry.len(), 0);
        assert_eq!(
            registry.get(session.id()).err(),
            Some(SessionError::NotFound(session.id()))
        );
        assert!(registry.remove(session.id()).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_evicted_and_active_ones_kept() {
        let registry = registry();
        let idle = registry.create(Preferences::default());
        let active = registry.create(Preferences::default());

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        registry.get(active.id()).unwrap();
        tokio::time::advance(Duration::from_secs(15 * 60)).await;

        assert_eq!(registry.evict_idle(Duration::from_secs(30 * 60)), 1);
        assert_eq!(
            registry.get(idle.id()).err(),
            Some(SessionError::NotFound(idle.id()))
        );
        assert!(registry.get(active.id()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_clears_abandoned_sessions() {
        let registry = Arc::new(registry());
        let handle = registry.spawn_sweeper(Duration::from_secs(1), Duration::from_secs(5));
        registry.create(Preferences::default());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(registry.is_empty());

        registry.shutdown_all();
        handle.await.unwrap();
    }

    #[test]
    fn sessions_are_independent() {
        let registry = registry();
        let a = registry.create(Preferences::default());
        let b = registry.create(Preferences {
            fast_mode: false,
            show_transcription: true,
        });
        assert_ne!(a.id(), b.id());
        assert!(a.snapshot().fast_mode);
        assert!(!b.snapshot().fast_mode);

        registry.shutdown_all();
        assert!(registry.is_empty());
    }
}
