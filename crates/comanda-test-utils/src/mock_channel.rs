// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events
//! and captured outbound messages for assertion in tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use comanda_core::{
    AdapterType, ChannelAdapter, ComandaError, HealthStatus, InboundEvent, MessageId,
    OutboundMessage, PluginAdapter,
};

/// A mock chat transport.
///
/// - **inbound**: events injected via `inject()` are returned by `receive()`
/// - **sent**: messages passed to `send()` are captured
/// - **typing**: chats that got a typing indicator
///
/// After `close()`, `receive()` drains the queue and then fails with a
/// "channel closed" error, which stops an agent loop.
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    typing: Arc<Mutex<Vec<String>>>,
    failing_recipients: Arc<Mutex<HashSet<String>>>,
    closed: AtomicBool,
    notify: Arc<Notify>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            typing: Arc::new(Mutex::new(Vec::new())),
            failing_recipients: Arc::new(Mutex::new(HashSet::new())),
            closed: AtomicBool::new(false),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Queues an event for the next `receive()`.
    pub async fn inject(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Makes `receive()` fail once the queue is empty.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Every send to `recipient` fails until cleared.
    pub async fn fail_sends_to(&self, recipient: impl Into<String>) {
        self.failing_recipients.lock().await.insert(recipient.into());
    }

    pub async fn clear_failures(&self) {
        self.failing_recipients.lock().await.clear();
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Messages sent to one recipient, in order.
    pub async fn sent_to(&self, recipient: &str) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.recipient == recipient)
            .cloned()
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    pub async fn typing_chats(&self) -> Vec<String> {
        self.typing.lock().await.clone()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ComandaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ComandaError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), ComandaError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ComandaError> {
        if self.failing_recipients.lock().await.contains(&msg.recipient) {
            return Err(ComandaError::Channel {
                message: format!("mock send to {} failed", msg.recipient),
                source: None,
            });
        }
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(msg);
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<InboundEvent, ComandaError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(ComandaError::Channel {
                    message: "mock channel closed".into(),
                    source: None,
                });
            }
            self.notify.notified().await;
        }
    }

    async fn send_typing(&self, chat_id: &str) -> Result<(), ComandaError> {
        self.typing.lock().await.push(chat_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comanda_core::{InboundKind, UserId};

    fn text_event(text: &str) -> InboundEvent {
        InboundEvent {
            user_id: UserId(1),
            chat_id: "1".into(),
            kind: InboundKind::Text(text.into()),
        }
    }

    #[tokio::test]
    async fn receive_returns_injected_events_in_order() {
        let channel = MockChannel::new();
        channel.inject(text_event("uno")).await;
        channel.inject(text_event("dos")).await;

        assert_eq!(channel.receive().await.unwrap(), text_event("uno"));
        assert_eq!(channel.receive().await.unwrap(), text_event("dos"));
    }

    #[tokio::test]
    async fn send_captures_and_can_fail_per_recipient() {
        let channel = MockChannel::new();
        let id = channel
            .send(OutboundMessage::text("1", "hola"))
            .await
            .unwrap();
        assert!(id.0.starts_with("mock-msg-"));

        channel.fail_sends_to("-100").await;
        assert!(channel.send(OutboundMessage::text("-100", "x")).await.is_err());
        assert_eq!(channel.sent_count().await, 1);
        assert_eq!(channel.sent_to("1").await[0].content, "hola");

        channel.clear_failures().await;
        assert!(channel.send(OutboundMessage::text("-100", "x")).await.is_ok());
    }

    #[tokio::test]
    async fn closed_channel_drains_then_errors() {
        let channel = MockChannel::new();
        channel.inject(text_event("último")).await;
        channel.close();

        assert!(channel.receive().await.is_ok());
        let err = channel.receive().await.unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    #[tokio::test]
    async fn typing_is_recorded() {
        let channel = MockChannel::new();
        channel.send_typing("42").await.unwrap();
        assert_eq!(channel.typing_chats().await, vec!["42".to_string()]);
    }
}
