/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
use std::fmt::Debug;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use acton_ern::Ern;
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, instrument, trace};

use crate::actor::{Idle, ManagedAgent};
use crate::common::clock::AgentClock;
use crate::common::pending::PendingRequests;
use crate::common::{mailbox, AgentSender, ParentRef};
use crate::message::{Envelope, MessageAddress, MessageId, OutboundEnvelope, Priority, SystemSignal};
use crate::traits::{AgentHandleInterface, HeraldMessage};

/// The dynamically typed handle to a started agent.
///
/// Holders of an `AgentHandle` can enqueue messages without any
/// compile-time shape verification; whether the agent has a handler for a
/// message is resolved at delivery time. Statically typed agents address
/// each other through [`TypedHandle`](crate::common::TypedHandle) instead
/// and reach dynamic agents only through the anonymous send family below.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    /// The unique identifier (ERN) for the agent.
    pub(crate) id: Ern,
    /// The sender half of the agent's two-lane mailbox.
    pub(crate) outbox: AgentSender,
    /// The task tracker for the agent.
    tracker: TaskTracker,
    /// The agent's optional parent handle.
    pub parent: Option<Box<ParentRef>>,
    children: DashMap<String, AgentHandle>,
    /// Cancels the agent's message loop and in-flight sends.
    pub(crate) cancellation_token: CancellationToken,
    /// The runtime clock, for delayed and scheduled sends.
    pub(crate) clock: AgentClock,
    /// Requests this agent has in flight.
    pub(crate) pending: PendingRequests,
}

impl Default for AgentHandle {
    fn default() -> Self {
        let (outbox, inbox) = mailbox::channel(crate::common::HERALD_CONFIG.limits.dummy_channel_size);
        drop(inbox);
        AgentHandle {
            id: Ern::default(),
            outbox,
            tracker: TaskTracker::new(),
            parent: None,
            children: DashMap::new(),
            cancellation_token: CancellationToken::new(),
            clock: AgentClock::new(),
            pending: PendingRequests::default(),
        }
    }
}

impl PartialEq for AgentHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AgentHandle {}

impl Hash for AgentHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl AgentHandle {
    /// Whether the agent behind this handle can still receive envelopes.
    pub fn is_alive(&self) -> bool {
        !self.outbox.is_closed() && !self.cancellation_token.is_cancelled()
    }

    /// Supervises a child agent by starting it and tracking its handle.
    #[instrument(skip(self))]
    pub async fn supervise<State: Default + Send + Debug>(
        &self,
        child: ManagedAgent<Idle, State>,
    ) -> anyhow::Result<AgentHandle> {
        trace!("Adding child agent with id: {}", child.id);
        let handle = child.start().await;
        let id = handle.id.clone();
        self.children.insert(id.to_string(), handle.clone());

        Ok(handle)
    }

    /// Sends `message` with normal priority and no sender identity.
    ///
    /// The recipient receives an envelope whose origin is anonymous: it
    /// has no resolvable address to reply to. This is the unchecked
    /// primitive every sender may use, whatever its typing.
    pub async fn anon_send(&self, message: impl HeraldMessage + 'static) {
        self.anon_send_prioritized(Priority::Normal, message).await;
    }

    /// Anonymous send with the given priority.
    #[instrument(skip(self, message), level = "trace", fields(recipient = %self.id, message_type = std::any::type_name_of_val(&message)))]
    pub async fn anon_send_prioritized(
        &self,
        priority: Priority,
        message: impl HeraldMessage + 'static,
    ) {
        let recipient = self.reply_address();
        let envelope = Envelope::new(MessageId::of(priority), Arc::new(message), None, recipient.clone());
        if let Err(e) = recipient.enqueue(envelope).await {
            error!(recipient = %self.id, error = %e, "Failed to deliver anonymous message");
        }
    }

    /// Registers an anonymous send for delivery after `delay`.
    ///
    /// Exactly one clock entry is registered; nothing is enqueued at call
    /// time, even for a zero delay.
    #[instrument(skip(self, message), level = "trace", fields(recipient = %self.id))]
    pub fn delayed_anon_send(&self, delay: Duration, message: impl HeraldMessage + 'static) {
        let deadline = self.clock.now() + delay;
        self.scheduled_anon_send(deadline, message);
    }

    /// Registers an anonymous send for delivery at `deadline`.
    ///
    /// A deadline already in the past fires at the next scheduling
    /// opportunity.
    #[instrument(skip(self, message), level = "trace", fields(recipient = %self.id))]
    pub fn scheduled_anon_send(&self, deadline: Instant, message: impl HeraldMessage + 'static) {
        let recipient = self.reply_address();
        let envelope = Envelope::new(
            MessageId::of(Priority::Normal),
            Arc::new(message),
            None,
            recipient.clone(),
        );
        self.clock.schedule_message(deadline, recipient, envelope);
    }
}

#[async_trait]
impl AgentHandleInterface for AgentHandle {
    /// Returns the addressable endpoint for this agent.
    fn reply_address(&self) -> MessageAddress {
        MessageAddress::new(
            self.outbox.clone(),
            self.id.clone(),
            self.pending.clone(),
            self.cancellation_token.clone(),
        )
    }

    /// Returns an envelope for the specified recipient, ready to send.
    #[instrument(skip(self))]
    fn create_envelope(&self, recipient_address: Option<MessageAddress>) -> OutboundEnvelope {
        let return_address = self.reply_address();
        OutboundEnvelope::new_with_recipient(
            Some(return_address),
            recipient_address,
            self.clock.clone(),
            self.cancellation_token.clone(),
        )
    }

    fn children(&self) -> DashMap<String, AgentHandle> {
        self.children.clone()
    }

    #[instrument(skip(self))]
    fn find_child(&self, ern: &Ern) -> Option<AgentHandle> {
        self.children
            .get(&ern.to_string())
            .map(|item| item.value().clone())
    }

    /// Returns the task tracker for the agent.
    fn tracker(&self) -> TaskTracker {
        self.tracker.clone()
    }

    fn id(&self) -> Ern {
        self.id.clone()
    }

    fn name(&self) -> String {
        self.id.root.to_string()
    }

    fn clone_ref(&self) -> AgentHandle {
        self.clone()
    }

    #[allow(clippy::manual_async_fn)]
    #[instrument(skip(self))]
    /// Stops the agent: the terminate signal rides the high-priority
    /// lane, the mailbox drains what it already holds, then the message
    /// loop ends.
    fn stop(&self) -> impl Future<Output = anyhow::Result<()>> + Send + Sync + '_ {
        async move {
            let tracker = self.tracker();

            trace!(agent = self.id.to_string(), "Sending Terminate to");
            let envelope = self.create_envelope(Some(self.reply_address()));
            envelope
                .send_prioritized(Priority::High, SystemSignal::Terminate)
                .await;

            trace!("Waiting for all agent tasks to complete.");
            tracker.wait().await;

            trace!(
                agent = self.id.to_string(),
                "The agent and its subordinates have been terminated."
            );
            Ok(())
        }
    }
}
