//! In-process registry of live push connections.
//!
//! Tracks, per user, the set of currently open socket connections. Created
//! once at process start, passed to the collaborators that need it, torn
//! down at shutdown; nothing here is persisted - reconnecting clients
//! re-register after a restart.
//!
//! Producers (the notification dispatcher's live-push channel) push frames
//! into a session; the socket task owning the receiving end forwards each
//! payload as one text frame.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// One frame queued for a live connection.
#[derive(Debug, Clone, PartialEq)]
pub enum PushFrame {
    /// A single JSON object, sent as one text frame.
    Payload(serde_json::Value),
    /// Tells the socket task to close the connection.
    Close,
}

/// Handle to one live push connection of a user.
///
/// Cloneable; all clones feed the same socket task. A user may hold many
/// sessions at once (multi-tab, multi-device).
#[derive(Debug, Clone)]
pub struct PushSession {
    id: Uuid,
    user_id: Uuid,
    tx: mpsc::UnboundedSender<PushFrame>,
}

impl PushSession {
    /// Create a session handle plus the receiving end for the socket task.
    pub fn channel(user_id: Uuid) -> (Self, mpsc::UnboundedReceiver<PushFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                user_id,
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Queue one payload frame. Returns false if the connection is gone.
    pub fn push(&self, value: serde_json::Value) -> bool {
        self.tx.send(PushFrame::Payload(value)).is_ok()
    }

    /// Ask the socket task to close the connection.
    pub fn close(&self) {
        let _ = self.tx.send(PushFrame::Close);
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Concurrent registry of live push connections, keyed by user.
///
/// Thread-safe and cloneable; callers never lock anything themselves.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Vec<PushSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the user's live set.
    pub async fn register(&self, session: PushSession) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(session.user_id).or_default().push(session);
    }

    /// Remove one connection, closing it first if still open.
    pub async fn remove(&self, session: &PushSession) {
        if session.is_open() {
            session.close();
        }

        let mut sessions = self.sessions.write().await;
        if let Some(live) = sessions.get_mut(&session.user_id) {
            live.retain(|s| s.id != session.id);
            if live.is_empty() {
                sessions.remove(&session.user_id);
            }
        }
    }

    /// Snapshot of the user's current live set; empty for unknown users.
    ///
    /// A snapshot, not a live view - senders iterate without holding the
    /// registry lock.
    pub async fn sessions_for(&self, user_id: Uuid) -> Vec<PushSession> {
        let sessions = self.sessions.read().await;
        sessions.get(&user_id).cloned().unwrap_or_default()
    }

    /// Liveness probe used before sending.
    pub fn is_open(&self, session: &PushSession) -> bool {
        session.is_open()
    }

    /// Drop sessions whose socket task has gone away (housekeeping).
    pub async fn prune(&self) {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, live| {
            live.retain(|s| s.is_open());
            !live.is_empty()
        });
    }
}
