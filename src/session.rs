//! Per-visitor consultation sessions.
//!
//! Each browser session owns at most one consultation: the validated intake
//! and the outcome derived from it. Nothing is shared between sessions.
//!
//! Key properties:
//! - Sessions exist only in memory
//! - Resubmitting the same intake returns the cached outcome
//! - Reset drops intake and outcome together
//! - Idle sessions are evicted when a new session is created

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::consultation::ConsultationOutcome;
use crate::models::PatientIntake;

// ═══════════════════════════════════════════════════════════
// Consultation: intake plus everything derived from it
// ═══════════════════════════════════════════════════════════

/// A completed consultation. Intake and outcome always travel together so
/// the outcome can never outlive the intake it was computed from.
#[derive(Debug, Clone)]
pub struct Consultation {
    pub intake: PatientIntake,
    pub outcome: Arc<ConsultationOutcome>,
    pub completed_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════
// ConsultationSession: one visitor
// ═══════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct ConsultationSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: Instant,
    consultation: Option<Consultation>,
}

impl ConsultationSession {
    fn new(now: Instant) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_active: now,
            consultation: None,
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_active) >= timeout
    }
}

/// Returned when a session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════
// SessionStore: all live sessions
// ═══════════════════════════════════════════════════════════

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, ConsultationSession>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, ConsultationSession>>, SessionError> {
        self.sessions.read().map_err(|_| SessionError::LockPoisoned)
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, ConsultationSession>>, SessionError> {
        self.sessions.write().map_err(|_| SessionError::LockPoisoned)
    }

    /// Start a new session, evicting idle ones first.
    pub fn create(&self) -> Result<SessionInfo, SessionError> {
        let now = Instant::now();
        let mut sessions = self.write()?;

        let evicted = self.retain_active(&mut sessions, now);
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle sessions");
        }

        let session = ConsultationSession::new(now);
        let info = SessionInfo {
            session_id: session.id,
            created_at: session.created_at,
        };
        sessions.insert(session.id, session);
        tracing::debug!(session_id = %info.session_id, active = sessions.len(), "Session created");
        Ok(info)
    }

    /// Current consultation for `id`, if one has been completed.
    pub fn consultation(&self, id: &Uuid) -> Result<Option<Consultation>, SessionError> {
        let mut sessions = self.write()?;
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound(*id))?;
        session.touch();
        Ok(session.consultation.clone())
    }

    /// Cached outcome when `intake` matches the session's current intake.
    pub fn cached_outcome(
        &self,
        id: &Uuid,
        intake: &PatientIntake,
    ) -> Result<Option<Arc<ConsultationOutcome>>, SessionError> {
        Ok(self
            .consultation(id)?
            .filter(|c| &c.intake == intake)
            .map(|c| c.outcome))
    }

    /// Replace the session's consultation wholesale.
    pub fn record(
        &self,
        id: &Uuid,
        intake: PatientIntake,
        outcome: ConsultationOutcome,
    ) -> Result<Arc<ConsultationOutcome>, SessionError> {
        let mut sessions = self.write()?;
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound(*id))?;
        let outcome = Arc::new(outcome);
        session.consultation = Some(Consultation {
            intake,
            outcome: Arc::clone(&outcome),
            completed_at: Utc::now(),
        });
        session.touch();
        Ok(outcome)
    }

    /// "New consultation": drop intake and outcome, keep the session.
    pub fn reset(&self, id: &Uuid) -> Result<(), SessionError> {
        let mut sessions = self.write()?;
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound(*id))?;
        session.consultation = None;
        session.touch();
        Ok(())
    }

    pub fn contains(&self, id: &Uuid) -> Result<bool, SessionError> {
        Ok(self.read()?.contains_key(id))
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> Result<usize, SessionError> {
        Ok(self.read()?.len())
    }

    /// Remove sessions idle as of `now`. Returns how many were removed.
    pub fn evict_idle(&self, now: Instant) -> Result<usize, SessionError> {
        let mut sessions = self.write()?;
        Ok(self.retain_active(&mut sessions, now))
    }

    fn retain_active(&self, sessions: &mut HashMap<Uuid, ConsultationSession>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_idle(now, self.idle_timeout));
        before - sessions.len()
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {0} not found or expired")]
    NotFound(Uuid),
    #[error("Session store lock poisoned")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
