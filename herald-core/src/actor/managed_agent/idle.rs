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

use std::any::TypeId;
use std::fmt::Debug;
use std::future::Future;
use std::mem;

use acton_ern::Ern;
use tracing::*;

use crate::actor::{AgentConfig, ManagedAgent, Started};
use crate::common::{mailbox, AgentRuntime, FutureBox, ReactorItem, TypedHandle, HERALD_CONFIG};
use crate::message::{Envelope, MessageContext, OutboundEnvelope};
use crate::traits::{AgentHandleInterface, HeraldMessage, Protocol};

/// Type-state marker for a [`ManagedAgent`] that has not started yet.
///
/// While idle, handlers and lifecycle hooks can be registered; starting
/// the agent consumes the builder and hands back a handle.
pub struct Idle;

impl<State: Default + Send + Debug + 'static> ManagedAgent<Idle, State> {
    /// Adds an asynchronous message handler for a specific message type.
    ///
    /// # Parameters
    /// - `message_processor`: The function to handle the message.
    #[instrument(skip(self, message_processor), level = "debug")]
    pub fn act_on<M>(
        &mut self,
        message_processor: impl for<'a> Fn(
                &'a mut ManagedAgent<Started, State>,
                &'a mut MessageContext<M>,
            ) -> FutureBox
            + Send
            + Sync
            + 'static,
    ) -> &mut Self
    where
        M: HeraldMessage + Clone + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<M>();
        trace!(type_name = std::any::type_name::<M>(), type_id=?type_id, "Adding message handler");
        let handler_box = Box::new(
            move |agent: &mut ManagedAgent<Started, State>, envelope: &mut Envelope| -> FutureBox {
                let envelope_type_id = envelope.message.as_any().type_id();
                trace!(
                    "Attempting to downcast message: expected_type_id = {:?}, envelope_type_id = {:?}",
                    type_id,
                    envelope_type_id
                );
                if let Some(concrete_msg) = downcast_message::<M>(&*envelope.message) {
                    let message = concrete_msg.clone();
                    let sent_time = envelope.timestamp;
                    let mut message_context = {
                        let clock = agent.handle.clock.clone();
                        let cancellation_token = agent.handle.cancellation_token.clone();
                        let own_address = agent.handle.reply_address();

                        // Envelope describing the original direction of travel.
                        let origin_envelope = OutboundEnvelope::new_with_recipient(
                            envelope.reply_to.clone(),
                            Some(envelope.recipient.clone()),
                            clock.clone(),
                            cancellation_token.clone(),
                        );
                        // Envelope pre-addressed back to the sender. With an
                        // anonymous origin there is nowhere to deliver to and
                        // sends through it no-op.
                        let mut reply_envelope = OutboundEnvelope::new_with_recipient(
                            Some(own_address),
                            envelope.reply_to.clone(),
                            clock,
                            cancellation_token,
                        );
                        if envelope.id.is_request() {
                            reply_envelope = reply_envelope.with_correlation(envelope.id);
                        }
                        MessageContext {
                            message,
                            timestamp: sent_time,
                            id: envelope.id,
                            origin_envelope,
                            reply_envelope,
                        }
                    };

                    // Call the user-provided function and get the future.
                    let user_future = message_processor(agent, &mut message_context);

                    // Automatically box and pin the user future.
                    Box::pin(user_future)
                } else {
                    error!(
                        type_name = std::any::type_name::<M>(),
                        "Should never get here, message failed to downcast"
                    );
                    Box::pin(async {})
                }
            },
        );

        // Insert the handler into the reactors map.
        self.reactors
            .insert(type_id, ReactorItem::FutureReactor(handler_box));
        self
    }

    /// Sets the hook called once the agent's message loop is running,
    /// before the first message is processed.
    pub fn after_start<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedAgent<Started, State>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + Sync + 'static,
    {
        self.after_start = Box::new(move |agent| Box::pin(f(agent)) as FutureBox);
        self
    }

    /// Sets the hook called before the agent's message loop starts.
    pub fn before_start<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedAgent<Started, State>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + Sync + 'static,
    {
        self.before_start = Box::new(move |agent| Box::pin(f(agent)) as FutureBox);
        self
    }

    /// Sets the hook called after the agent stops processing messages.
    pub fn after_stop<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedAgent<Started, State>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + Sync + 'static,
    {
        self.after_stop = Box::new(move |agent| Box::pin(f(agent)) as FutureBox);
        self
    }

    /// Sets the hook called just before the agent stops processing
    /// messages in its mailbox.
    pub fn before_stop<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedAgent<Started, State>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + Sync + 'static,
    {
        self.before_stop = Box::new(move |agent| Box::pin(f(agent)) as FutureBox);
        self
    }

    /// Creates a new idle child agent sharing this agent's runtime.
    #[instrument(skip(self))]
    pub async fn create_child(&self) -> ManagedAgent<Idle, State> {
        ManagedAgent::new(&Some(self.runtime.clone()), None).await
    }

    #[instrument]
    pub(crate) async fn new(runtime: &Option<AgentRuntime>, config: Option<AgentConfig>) -> Self {
        let mut managed_agent: ManagedAgent<Idle, State> = ManagedAgent::default();

        if let Some(config) = &config {
            managed_agent.handle.id = config.ern();
            managed_agent.parent = config.parent().clone();
        }

        debug_assert!(
            !managed_agent.handle.outbox.is_closed(),
            "Agent mailbox is closed in new"
        );

        trace!("NEW AGENT: {}", &managed_agent.handle.id());

        if let Some(runtime) = runtime {
            // Agents spawned by a runtime share its scheduling clock.
            managed_agent.handle.clock = runtime.clock();
            managed_agent.runtime = runtime.clone();
        }

        managed_agent.id = managed_agent.handle.id();

        managed_agent
    }

    /// Starts the agent and returns its dynamically typed handle.
    #[instrument(skip(self))]
    pub async fn start(mut self) -> crate::common::AgentHandle {
        let reactors = mem::take(&mut self.reactors);
        let agent_handle = self.handle.clone();
        let active_agent: ManagedAgent<Started, State> = self.into();
        let agent = Box::leak(Box::new(active_agent));

        debug_assert!(
            !agent.handle.outbox.is_closed(),
            "Agent mailbox is closed in start"
        );
        (agent.before_start)(agent).await;
        agent_handle.tracker().spawn(agent.wake(reactors));
        agent_handle.tracker().close();

        agent_handle
    }

    /// Starts the agent and returns a statically typed handle tagged with
    /// the model's protocol.
    ///
    /// Available only when the model implements [`Protocol`]; the typed
    /// handle participates in the compile-time send gate, while the
    /// dynamic handle remains reachable through
    /// [`TypedHandle::handle`].
    #[instrument(skip(self))]
    pub async fn start_typed(self) -> TypedHandle<State>
    where
        State: Protocol,
    {
        TypedHandle::new(self.start().await)
    }
}

impl<State: Default + Send + Debug + 'static> From<ManagedAgent<Idle, State>>
    for ManagedAgent<Started, State>
{
    fn from(value: ManagedAgent<Idle, State>) -> Self {
        debug_assert!(
            !value.inbox.is_closed(),
            "Agent mailbox is closed before conversion in From<ManagedAgent<Idle, State>>"
        );

        ManagedAgent::<Started, State> {
            handle: value.handle,
            parent: value.parent,
            id: value.id,
            runtime: value.runtime,
            model: value.model,
            tracker: value.tracker,
            inbox: value.inbox,
            before_start: value.before_start,
            after_start: value.after_start,
            before_stop: value.before_stop,
            after_stop: value.after_stop,
            reactors: value.reactors,
            _agent_state: Default::default(),
        }
    }
}

impl<State: Default + Send + Debug + 'static> Default for ManagedAgent<Idle, State> {
    fn default() -> Self {
        let (outbox, inbox) = mailbox::channel(HERALD_CONFIG.limits.agent_inbox_capacity);
        let id: Ern = Default::default();
        let mut handle: crate::common::AgentHandle = Default::default();
        handle.id = id.clone();
        handle.outbox = outbox.clone();

        ManagedAgent::<Idle, State> {
            handle,
            id,
            inbox,
            before_start: Box::new(|a: &'_ ManagedAgent<Started, State>| default_handler(a)),
            after_start: Box::new(|a: &'_ ManagedAgent<Started, State>| default_handler(a)),
            before_stop: Box::new(|a: &'_ ManagedAgent<Started, State>| default_handler(a)),
            after_stop: Box::new(|a: &'_ ManagedAgent<Started, State>| default_handler(a)),
            model: State::default(),
            parent: Default::default(),
            runtime: Default::default(),
            tracker: Default::default(),
            reactors: Default::default(),
            _agent_state: Default::default(),
        }
    }
}

fn default_handler<State: Debug + Send + Default>(
    _agent: &'_ ManagedAgent<Started, State>,
) -> FutureBox {
    Box::pin(async {})
}

// Function to downcast the message to the original type.
pub fn downcast_message<T: 'static>(msg: &dyn HeraldMessage) -> Option<&T> {
    msg.as_any().downcast_ref::<T>()
}
