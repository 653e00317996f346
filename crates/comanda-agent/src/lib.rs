// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation handling for the Comanda order bot.
//!
//! The [`AgentLoop`] is the central coordinator that:
//! - Receives customer events from the channel adapter
//! - Gives each customer an ordered lane so turns never interleave
//! - Drains in-flight turns on shutdown

pub mod order_agent;
pub mod prompt;
pub mod replies;
pub mod session;
pub mod shutdown;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use comanda_core::{ChannelAdapter, ComandaError, InboundEvent, UserId};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub use order_agent::{AgentSettings, OrderAgent, TurnOutcome};
pub use session::{ConversationSession, SessionHandle, SessionState, SessionStore};

/// Pulls events off the channel and hands them to the [`OrderAgent`].
pub struct AgentLoop {
    channel: Arc<dyn ChannelAdapter>,
    agent: Arc<OrderAgent>,
    drain_timeout: Duration,
}

impl AgentLoop {
    /// `channel` must already be connected.
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        agent: Arc<OrderAgent>,
        drain_timeout: Duration,
    ) -> Self {
        info!(
            agent_name = agent.settings().bot_name.as_str(),
            "agent loop initialized"
        );
        Self {
            channel,
            agent,
            drain_timeout,
        }
    }

    /// Runs until `cancel` fires or the channel closes.
    ///
    /// Every customer gets a lane: a task that handles that customer's events
    /// one at a time, in arrival order. Lanes run concurrently.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ComandaError> {
        info!("agent loop running");
        let mut lanes: HashMap<UserId, mpsc::UnboundedSender<InboundEvent>> = HashMap::new();
        let mut tasks: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                event = self.channel.receive() => {
                    match event {
                        Ok(event) => self.route(event, &mut lanes, &mut tasks),
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                Some(finished) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = finished {
                        warn!(error = %e, "customer lane ended abnormally");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }

        // Closing the senders lets each lane finish its queue and exit.
        drop(lanes);
        info!(
            lanes = tasks.len(),
            turns_in_flight = self.agent.sessions().busy_count(),
            "draining customer lanes"
        );
        shutdown::drain_tasks(&mut tasks, self.drain_timeout).await;

        if let Err(e) = self.channel.shutdown().await {
            warn!(error = %e, "channel shutdown failed");
        }

        info!("agent loop stopped");
        Ok(())
    }

    fn route(
        &self,
        event: InboundEvent,
        lanes: &mut HashMap<UserId, mpsc::UnboundedSender<InboundEvent>>,
        tasks: &mut JoinSet<()>,
    ) {
        let user_id = event.user_id;
        debug!(user_id = %user_id, "routing inbound event");

        let event = match lanes.get(&user_id) {
            Some(lane) => match lane.send(event) {
                Ok(()) => return,
                // The lane's task is gone; start a fresh one below.
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<InboundEvent>();
        let agent = Arc::clone(&self.agent);
        tasks.spawn(async move {
            while let Some(event) = rx.recv().await {
                agent.process(event).await;
            }
        });
        if tx.send(event).is_err() {
            error!(user_id = %user_id, "customer lane closed before first event");
            return;
        }
        lanes.insert(user_id, tx);
    }
}
