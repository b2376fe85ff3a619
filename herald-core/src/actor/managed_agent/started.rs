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

use std::any::type_name_of_val;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{instrument, trace, warn};

use crate::actor::ManagedAgent;
use crate::common::{AgentHandle, ReactorItem, ReactorMap, TypedContext, HERALD_CONFIG};
use crate::message::{
    Envelope, MessageAddress, MessageId, OutboundEnvelope, Priority, RequestError, SystemSignal,
};
use crate::traits::{AgentHandleInterface, HeraldMessage, Protocol};

/// Type-state marker for a [`ManagedAgent`] that is actively running and
/// processing messages.
///
/// When a `ManagedAgent` is in the `Started` state, its main asynchronous
/// task (`wake`) is running, receiving envelopes from its two-lane inbox
/// and dispatching them to the handlers registered during the
/// [`Idle`](super::Idle) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Started;

/// Implements methods specific to a `ManagedAgent` in the `Started` state.
impl<Agent: Default + Send + Debug + 'static> ManagedAgent<Started, Agent> {
    /// Creates a new [`OutboundEnvelope`] from this agent to `recipient`.
    ///
    /// The envelope's return address is this agent's own
    /// [`MessageAddress`], so the recipient can reply.
    pub fn new_envelope(&self, recipient: &MessageAddress) -> OutboundEnvelope {
        OutboundEnvelope::new_with_recipient(
            Some(self.handle.reply_address()),
            Some(recipient.clone()),
            self.handle.clock.clone(),
            self.handle.cancellation_token.clone(),
        )
    }

    /// Creates a new [`OutboundEnvelope`] addressed to this agent's
    /// parent, or `None` for a top-level agent.
    pub fn new_parent_envelope(&self) -> Option<OutboundEnvelope> {
        self.parent
            .as_ref()
            .map(|parent_handle| self.new_envelope(&parent_handle.reply_address()))
    }

    /// The typed send capability of this agent.
    ///
    /// Available only when the agent's model implements [`Protocol`];
    /// every send or request made through the returned context is
    /// verified against the destination's declared signatures at compile
    /// time. The context is owned and cloneable, so handlers can move it
    /// into the futures they return.
    pub fn typed(&self) -> TypedContext<Agent>
    where
        Agent: Protocol,
    {
        TypedContext::new(
            self.handle.reply_address(),
            self.handle.clock.clone(),
            self.handle.cancellation_token.clone(),
        )
    }

    /// Sends `message` to `dest` as an untyped request and resolves with
    /// the untyped response payload, with the configured default timeout.
    ///
    /// This is the fallback primitive for dynamically typed agents; no
    /// compile-time verification relates the message to the response.
    /// The returned future is detached from the agent, so handlers can
    /// move it into the future they return.
    pub fn request_any(
        &self,
        dest: &AgentHandle,
        message: impl HeraldMessage + 'static,
    ) -> impl Future<Output = Result<Arc<dyn HeraldMessage + Send + Sync + 'static>, RequestError>>
           + Send
           + Sync
           + 'static {
        self.request_any_within(HERALD_CONFIG.request_timeout(), dest, message)
    }

    /// Untyped request with an explicit timeout.
    pub fn request_any_within(
        &self,
        timeout: Duration,
        dest: &AgentHandle,
        message: impl HeraldMessage + 'static,
    ) -> impl Future<Output = Result<Arc<dyn HeraldMessage + Send + Sync + 'static>, RequestError>>
           + Send
           + Sync
           + 'static {
        let cancelled = self.handle.cancellation_token.is_cancelled();
        let own_address = self.handle.reply_address();
        let recipient = dest.reply_address();

        async move {
            if cancelled {
                return Err(RequestError::Cancelled);
            }

            let id = MessageId::request(Priority::Normal);
            let receiver = own_address.pending.register(id.correlation());
            let envelope = Envelope::new(
                id,
                Arc::new(message),
                Some(own_address.clone()),
                recipient.clone(),
            );

            if let Err(e) = recipient.enqueue(envelope).await {
                own_address.pending.discard(id.correlation());
                warn!(error = %e, "Request dispatch failed");
                return Err(RequestError::Unreachable);
            }

            match tokio::time::timeout(timeout, receiver).await {
                Err(_elapsed) => {
                    own_address.pending.discard(id.correlation());
                    Err(RequestError::Timeout(timeout))
                }
                Ok(Err(_closed)) => Err(RequestError::Unreachable),
                Ok(Ok(payload)) => Ok(payload),
            }
        }
    }

    // wake() and terminate() are internal implementation details and do
    // not require public documentation.
    #[instrument(skip(reactors, self))]
    pub(crate) async fn wake(&mut self, reactors: ReactorMap<Agent>) {
        (self.after_start)(self).await;
        let mut terminate_requested = false;
        let cancel_token = self.handle.cancellation_token.clone();
        let mut cancel = Box::pin(cancel_token.cancelled());

        loop {
            tokio::select! {
                // React immediately to cancellation
                _ = &mut cancel => {
                    trace!("Cancellation token triggered for agent: {}", self.id);
                    break;
                }
                incoming_opt = self.inbox.recv() => {
                    let Some(mut envelope) = incoming_opt else { break; };
                    trace!(
                        "Received envelope from: {}",
                        envelope
                            .reply_to
                            .as_ref()
                            .map_or_else(|| "anonymous".to_string(), |a| a.sender.root.to_string())
                    );
                    trace!("Message type: {}", type_name_of_val(&envelope.message));

                    let type_id = envelope.message.as_any().type_id();

                    // Dispatch to registered handler or handle system signals
                    if let Some(reactor) = reactors.get(&type_id) {
                        match reactor.value() {
                            ReactorItem::FutureReactor(fut) => {
                                fut(self, &mut envelope).await;
                            }
                        }
                    } else if let Some(SystemSignal::Terminate) =
                        envelope.message.as_any().downcast_ref::<SystemSignal>()
                    {
                        trace!("Terminate signal received for agent: {}", self.id);
                        terminate_requested = true;
                        (self.before_stop)(self).await;
                        // Short delay to allow before_stop processing, if needed.
                        sleep(Duration::from_millis(10)).await;
                        self.inbox.close(); // Stop receiving new messages
                        trace!("Inbox closed for agent: {}", self.id);
                    } else {
                        trace!(
                            "No handler found for message type {:?} for agent {}",
                            type_id,
                            self.id
                        );
                    }

                    // Check if termination requested and inbox is now drained
                    if terminate_requested && self.inbox.is_empty() && self.inbox.is_closed() {
                        trace!("Inbox empty and closed after terminate request, initiating termination for agent: {}", self.id);
                        self.terminate().await;
                        break;
                    }
                }
            }
        }
        trace!("Message loop finished for agent: {}", self.id);
        // The agent no longer receives; mark every outstanding handle dead.
        self.inbox.close();
        self.handle.cancellation_token.cancel();
        (self.after_stop)(self).await;
        trace!("Agent {} stopped.", self.id);
    }

    #[instrument(skip(self))]
    async fn terminate(&mut self) {
        trace!("Terminating children for agent: {}", self.id);
        use std::env;
        use tokio::time::timeout as tokio_timeout;

        // Stop all child agents concurrently, each within the configured
        // shutdown budget (overridable through the environment).
        let shutdown_timeout: Duration = env::var("HERALD_AGENT_SHUTDOWN_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| HERALD_CONFIG.agent_shutdown_timeout());

        let stop_futures: Vec<_> = self
            .handle
            .children()
            .iter()
            .map(|item| {
                let child_handle = item.value().clone();
                async move {
                    trace!("Sending stop signal to child: {}", child_handle.id());
                    let stop_res = tokio_timeout(shutdown_timeout, child_handle.stop()).await;
                    match stop_res {
                        Ok(Ok(())) => {
                            trace!(
                                "Stop signal sent to and child {} shut down successfully.",
                                child_handle.id()
                            );
                        }
                        Ok(Err(e)) => {
                            tracing::error!(
                                "Stop signal to child {} returned error: {:?}",
                                child_handle.id(),
                                e
                            );
                        }
                        Err(_) => {
                            tracing::error!(
                                "Shutdown timeout for child {} after {:?}",
                                child_handle.id(),
                                shutdown_timeout
                            );
                        }
                    }
                }
            })
            .collect();

        join_all(stop_futures).await;

        trace!(
            "All children stopped for agent: {}. Closing own inbox.",
            self.id
        );
        // Ensure inbox is closed (might be redundant if closed in wake loop, but safe).
        self.inbox.close();
    }
}
