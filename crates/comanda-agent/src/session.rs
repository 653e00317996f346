// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-customer conversation state and the store that owns it.
//!
//! A session moves Idle -> AwaitingDetails on its first message and back to
//! Idle on reset, cancel, or a dispatched order. Sessions live only in
//! memory.

use std::sync::Arc;

use comanda_core::{ChatMessage, DeliveryFee, UserId};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Where a conversation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing said yet, or just reset.
    Idle,
    /// Collecting the order.
    AwaitingDetails,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::AwaitingDetails => write!(f, "awaiting_details"),
        }
    }
}

/// One customer's history and cached delivery fee.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    user_id: UserId,
    history: Vec<ChatMessage>,
    delivery_fee: Option<DeliveryFee>,
}

impl ConversationSession {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            history: Vec::new(),
            delivery_fee: None,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn state(&self) -> SessionState {
        if self.history.is_empty() && self.delivery_fee.is_none() {
            SessionState::Idle
        } else {
            SessionState::AwaitingDetails
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    /// Fee computed from the customer's last shared location.
    pub fn delivery_fee(&self) -> Option<DeliveryFee> {
        self.delivery_fee
    }

    pub fn set_delivery_fee(&mut self, fee: DeliveryFee) {
        self.delivery_fee = Some(fee);
    }

    /// Clears history and the cached fee.
    pub fn reset(&mut self) {
        debug!(
            user_id = %self.user_id,
            messages = self.history.len(),
            "session reset"
        );
        self.history.clear();
        self.delivery_fee = None;
    }
}

/// Shared handle to a session; holding the lock serializes that user's turns.
pub type SessionHandle = Arc<Mutex<ConversationSession>>;

/// All live sessions, keyed by user.
///
/// Entries are created on first contact and never removed, so a user's turns
/// always contend on the same lock.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's session, creating an idle one on first contact.
    pub fn get_or_create(&self, user_id: UserId) -> SessionHandle {
        self.sessions
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(ConversationSession::new(user_id))))
            .clone()
    }

    pub fn get(&self, user_id: UserId) -> Option<SessionHandle> {
        self.sessions.get(&user_id).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions whose lock is currently held by a running turn.
    pub fn busy_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().try_lock().is_err())
            .count()
    }
}
