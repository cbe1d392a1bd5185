//! Relay session state machine and lifecycle tracking.
//!
//! # Responsibilities
//! - Track session state (Accepted → HandshakeDone → Forwarding → Completed | Failed)
//! - Generate unique session IDs for tracing
//! - Emit the access-log record exactly once, when the outcome is known
//!
//! A session covers one client request/response cycle through the relay.
//! Transitions are unidirectional; no session revisits an earlier state.

use std::sync::atomic::{AtomicU64, Ordering};

use http::{Method, StatusCode};

use crate::error::FailureClass;
use crate::observability::logging;

/// Process-wide source of session IDs. Uniqueness is all that matters
/// here, so relaxed ordering does.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one request/response cycle in log output. IDs are
/// monotonically increasing within a process and carry no meaning
/// across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next ID.
    pub fn new() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for callers that need to embed the ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Raw connection accepted.
    Accepted,
    /// TLS handshake completed; HTTP semantics apply from here.
    HandshakeDone,
    /// Request/response bytes are being relayed.
    Forwarding,
    /// Response delivered in full.
    Completed,
    /// Session ended abnormally.
    Failed,
}

impl SessionState {
    fn rank(self) -> u8 {
        match self {
            SessionState::Accepted => 0,
            SessionState::HandshakeDone => 1,
            SessionState::Forwarding => 2,
            SessionState::Completed => 3,
            SessionState::Failed => 3,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Failed)
    }
}

/// Per-request session state.
///
/// The session finishes exactly once: `complete` on normal end of the
/// response stream, `fail` on any error, or the drop failsafe when the
/// session is discarded mid-flight (client went away). Whichever happens
/// first emits the access record; the rest are no-ops.
#[derive(Debug)]
pub struct RelaySession {
    id: SessionId,
    method: Method,
    path: String,
    status: Option<StatusCode>,
    state: SessionState,
}

impl RelaySession {
    /// Create a session for a decrypted inbound request.
    pub fn new(method: Method, path: String) -> Self {
        Self {
            id: SessionId::new(),
            method,
            path,
            status: None,
            state: SessionState::Accepted,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Record the status the upstream responded with.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Advance to a later non-terminal state. Backward transitions are
    /// ignored (and flagged in debug builds); terminal states are reached
    /// through `complete`/`fail` only.
    pub fn advance(&mut self, next: SessionState) {
        debug_assert!(!next.is_terminal(), "use complete()/fail() for terminal states");
        if next.rank() > self.state.rank() && !next.is_terminal() {
            tracing::trace!(session = %self.id, state = ?next, "Session state");
            self.state = next;
        } else {
            debug_assert!(
                next.rank() > self.state.rank(),
                "session transitions are unidirectional"
            );
        }
    }

    /// Finish normally and emit the access record. No-op if already
    /// finished.
    pub fn complete(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = SessionState::Completed;
        let status = self.status.unwrap_or(StatusCode::OK);
        logging::access(&self.method, &self.path, status);
    }

    /// Finish abnormally and emit the access record. No-op if already
    /// finished.
    pub fn fail(&mut self, class: FailureClass, detail: &str) {
        if self.state.is_terminal() {
            return;
        }
        self.state = SessionState::Failed;
        logging::access_failure(&self.method, &self.path, self.status, class, detail);
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}

impl Drop for RelaySession {
    fn drop(&mut self) {
        // Failsafe: a session dropped mid-flight means the client went
        // away before the response completed.
        if !self.state.is_terminal() {
            self.fail(
                FailureClass::ClientAborted,
                "connection closed before response completed",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn transitions_are_unidirectional() {
        let mut session = RelaySession::new(Method::GET, "/docs".into());
        assert_eq!(session.state(), SessionState::Accepted);

        session.advance(SessionState::HandshakeDone);
        session.advance(SessionState::Forwarding);
        assert_eq!(session.state(), SessionState::Forwarding);

        session.set_status(StatusCode::OK);
        session.complete();
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn finish_is_idempotent() {
        let mut session = RelaySession::new(Method::POST, "/login".into());
        session.advance(SessionState::Forwarding);
        session.fail(FailureClass::UpstreamUnavailable, "connection refused");
        assert!(session.is_finished());

        // Later completion attempts must not flip the outcome.
        session.complete();
        assert_eq!(session.state(), SessionState::Failed);
    }
}
