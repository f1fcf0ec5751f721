//! The shared room every session joins.
//!
//! Membership lives behind a single mutex. Fan-out happens while the lock is
//! held, which gives every member the same delivery order for broadcasts the
//! room processed; it is safe because [`Session::send`] never blocks and
//! never calls back into the room.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    domain::{ChatMessage, DisplayName, ProtocolError, RoomError},
    infrastructure::dto::websocket::encode_outbound,
};

use super::session::Session;

type Members = HashMap<DisplayName, Arc<Session>>;

#[derive(Default)]
pub struct Room {
    sessions: Mutex<Members>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session and announce it to every member, itself included.
    pub fn join(&self, session: &Arc<Session>) -> Result<(), RoomError> {
        let mut sessions = self.lock();
        if sessions.contains_key(session.name()) {
            return Err(RoomError::AlreadyJoined(session.name().to_string()));
        }
        sessions.insert(session.name().clone(), Arc::clone(session));
        tracing::info!(
            "'{}' joined the room ({} sessions)",
            session.name(),
            sessions.len()
        );

        Self::announce(&sessions, &ChatMessage::joined(session.name()));
        Ok(())
    }

    /// Remove a session, then announce its departure to the remaining members.
    ///
    /// The departing session does not receive its own leave notice. Only the
    /// registered session itself can leave, not another one with its name.
    pub fn leave(&self, session: &Session) -> Result<(), RoomError> {
        let mut sessions = self.lock();
        let is_member = sessions
            .get(session.name())
            .is_some_and(|member| std::ptr::eq(Arc::as_ptr(member), session));
        if !is_member {
            return Err(RoomError::NotJoined(session.name().to_string()));
        }
        sessions.remove(session.name());
        tracing::info!(
            "'{}' left the room ({} sessions)",
            session.name(),
            sessions.len()
        );

        Self::announce(&sessions, &ChatMessage::left(session.name()));
        Ok(())
    }

    /// Deliver a message to every member. Returns the number of recipients.
    pub fn broadcast(&self, message: &ChatMessage) -> Result<usize, ProtocolError> {
        Self::fan_out(&self.lock(), message, None)
    }

    /// Deliver a message written by `sender` to every other member.
    pub fn relay_from(
        &self,
        sender: &Session,
        message: &ChatMessage,
    ) -> Result<usize, ProtocolError> {
        Self::fan_out(&self.lock(), message, Some(sender.name()))
    }

    /// Current number of members. Only used for status reporting.
    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    /// Stop every member, e.g. on server shutdown. Each session leaves the
    /// room on its own as it winds down.
    pub fn stop_all(&self) {
        let sessions = self.lock();
        tracing::info!("Stopping {} sessions", sessions.len());
        for session in sessions.values() {
            session.stop();
        }
    }

    fn announce(sessions: &Members, message: &ChatMessage) {
        if let Err(e) = Self::fan_out(sessions, message, None) {
            tracing::error!("Failed to announce membership change: {}", e);
        }
    }

    fn fan_out(
        sessions: &Members,
        message: &ChatMessage,
        skip: Option<&DisplayName>,
    ) -> Result<usize, ProtocolError> {
        let payload = encode_outbound(message)?;

        let mut delivered = 0;
        for (name, session) in sessions {
            if Some(name) == skip {
                continue;
            }
            session.send(payload.clone());
            delivered += 1;
        }

        tracing::debug!(
            "Broadcasted message from '{}' to {} sessions",
            message.author(),
            delivered
        );
        Ok(delivered)
    }

    fn lock(&self) -> MutexGuard<'_, Members> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
