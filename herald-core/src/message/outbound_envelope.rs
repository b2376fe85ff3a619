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

use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::runtime::{Handle, Runtime};
use tokio::time::Instant;
use tracing::{debug, error, instrument, trace, warn};

use crate::common::AgentClock;
use crate::message::message_address::MessageAddress;
use crate::message::{Envelope, MessageError, MessageId, Priority};
use crate::traits::HeraldMessage;

/// Shared runtime for synchronous `reply()` calls made outside of a Tokio
/// context.
///
/// This runtime is created lazily on first use and persists for the
/// process lifetime. Using a shared runtime avoids the overhead of
/// creating a new runtime (and associated thread pools) for each
/// `reply()` call from non-async code.
static SYNC_REPLY_RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn sync_reply_runtime() -> &'static Runtime {
    SYNC_REPLY_RUNTIME.get_or_init(|| {
        debug!("Creating shared fallback runtime for sync reply() calls");
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .thread_name("herald-sync-reply")
            .build()
            .expect("Failed to create fallback Tokio runtime for sync reply()")
    })
}

/// A message prepared for sending: the sender's identity (if any), the
/// recipient, and the scheduling context needed to dispatch it.
///
/// An `OutboundEnvelope` is the identity-carrying dynamic send facade.
/// Agents obtain one through
/// [`AgentHandleInterface::create_envelope`](crate::traits::AgentHandleInterface::create_envelope)
/// or from a [`MessageContext`](crate::message::MessageContext) inside a
/// handler. A `return_address` of `None` marks an anonymous origin; a
/// `recipient_address` of `None` makes every dispatch a silent no-op,
/// mirroring a null destination handle.
///
/// Equality and hashing are based solely on the sender identity.
#[derive(Clone, Debug)]
pub struct OutboundEnvelope {
    /// The address of the agent sending the message, if it has one.
    pub(crate) return_address: Option<MessageAddress>,
    /// The address of the intended recipient.
    pub(crate) recipient_address: Option<MessageAddress>,
    /// Set when this envelope answers a request: the id of that request.
    pub(crate) correlation: Option<MessageId>,
    /// The clock used for delayed and scheduled dispatch.
    pub(crate) clock: AgentClock,
    /// The cancellation token for the sending agent.
    pub(crate) cancellation_token: tokio_util::sync::CancellationToken,
}

impl PartialEq for OutboundEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.return_address == other.return_address
    }
}

impl Eq for OutboundEnvelope {}

impl Hash for OutboundEnvelope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash only the sender identity, consistent with PartialEq.
        self.return_address
            .as_ref()
            .map(|address| &address.sender)
            .hash(state);
    }
}

impl OutboundEnvelope {
    /// Crate-internal constructor: sender and recipient as known.
    /// An envelope without a recipient discards everything sent through
    /// it; one without a return address delivers anonymously.
    #[instrument(skip(return_address, recipient_address, clock, cancellation_token))]
    pub(crate) fn new_with_recipient(
        return_address: Option<MessageAddress>,
        recipient_address: Option<MessageAddress>,
        clock: AgentClock,
        cancellation_token: tokio_util::sync::CancellationToken,
    ) -> Self {
        Self {
            return_address,
            recipient_address,
            correlation: None,
            clock,
            cancellation_token,
        }
    }

    /// Crate-internal: marks this envelope as the answer to `request_id`.
    /// Dispatched messages then carry the response id derived from it.
    pub(crate) fn with_correlation(mut self, request_id: MessageId) -> Self {
        self.correlation = Some(request_id);
        self
    }

    /// Returns a clone of the sender's [`MessageAddress`], if the sender
    /// has a resolvable identity.
    #[inline]
    #[must_use]
    pub fn reply_to(&self) -> Option<MessageAddress> {
        self.return_address.clone()
    }

    /// Returns a reference to the optional recipient's [`MessageAddress`].
    #[inline]
    #[must_use]
    pub const fn recipient(&self) -> &Option<MessageAddress> {
        &self.recipient_address
    }

    /// The id the next dispatched message will carry.
    fn next_message_id(&self, priority: Priority) -> MessageId {
        match self.correlation {
            Some(request_id) => request_id.response_id(),
            None => MessageId::of(priority),
        }
    }

    /// Sends a message using this envelope synchronously.
    ///
    /// If called from within a Tokio runtime context, the send is spawned
    /// on the existing runtime; outside any Tokio context a shared
    /// fallback runtime executes it. Prefer the asynchronous
    /// [`send`](Self::send) whenever possible.
    #[instrument(skip(self, message), fields(message_type = std::any::type_name_of_val(&message)))]
    pub fn reply(&self, message: impl HeraldMessage + 'static) -> Result<(), MessageError> {
        let envelope = self.clone();
        let message_arc = Arc::new(message);

        if let Ok(handle) = Handle::try_current() {
            trace!(
                sender = ?envelope.return_address.as_ref().map(|r| r.sender.to_string()),
                "Replying via existing runtime handle"
            );
            handle.spawn(Box::pin(async move {
                envelope
                    .send_message_inner(message_arc, Priority::Normal)
                    .await;
            }));
        } else {
            warn!("reply() called outside Tokio context; using shared fallback runtime");
            sync_reply_runtime().spawn(async move {
                envelope
                    .send_message_inner(message_arc, Priority::Normal)
                    .await;
            });
        }
        Ok(())
    }

    /// Crate-internal: asynchronously dispatches the payload to the
    /// recipient, minting the envelope id and logging delivery failures.
    pub(crate) async fn send_message_inner(
        &self,
        message: Arc<dyn HeraldMessage + Send + Sync>,
        priority: Priority,
    ) {
        let Some(target_address) = self.recipient_address.as_ref() else {
            // Null destination: dropping the message is the contract.
            trace!(
                sender = ?self.return_address.as_ref().map(|r| r.sender.to_string()),
                "Envelope has no recipient; message discarded"
            );
            return;
        };

        if self.cancellation_token.is_cancelled() {
            error!(recipient = %target_address.sender, "Send aborted: cancellation_token triggered");
            return;
        }

        let id = self.next_message_id(priority);
        let envelope = Envelope::new(id, message, self.return_address.clone(), target_address.clone());
        if let Err(e) = target_address.enqueue(envelope).await {
            error!(
                sender = ?self.return_address.as_ref().map(|r| r.sender.to_string()),
                recipient = %target_address.sender,
                error = %e,
                "Failed to deliver message"
            );
        }
    }

    /// Sends a message asynchronously with normal priority.
    ///
    /// Fire-and-forget: delivery failures are logged internally. For
    /// explicit error handling use [`try_send`](Self::try_send).
    #[instrument(skip(self, message), level = "trace", fields(message_type = std::any::type_name_of_val(&message)))]
    pub async fn send(&self, message: impl HeraldMessage + 'static) {
        self.send_message_inner(Arc::new(message), Priority::Normal)
            .await;
    }

    /// Sends a message asynchronously with the given priority.
    #[instrument(skip(self, message), level = "trace", fields(message_type = std::any::type_name_of_val(&message)))]
    pub async fn send_prioritized(&self, priority: Priority, message: impl HeraldMessage + 'static) {
        self.send_message_inner(Arc::new(message), priority).await;
    }

    /// Sends a message asynchronously with explicit error handling.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient's mailbox is closed
    /// (`MessageError::ChannelClosed`), the operation was cancelled
    /// (`MessageError::Cancelled`), or lane capacity could not be
    /// reserved (`MessageError::SendFailed`).
    #[instrument(skip(self, message), level = "trace", fields(message_type = std::any::type_name_of_val(&message)))]
    pub async fn try_send(
        &self,
        message: impl HeraldMessage + 'static,
    ) -> Result<(), MessageError> {
        let message = Arc::new(message);

        let Some(target_address) = self.recipient_address.as_ref() else {
            trace!("Envelope has no recipient; nothing to deliver");
            return Ok(());
        };

        if self.cancellation_token.is_cancelled() {
            return Err(MessageError::Cancelled);
        }

        let id = self.next_message_id(Priority::Normal);
        let envelope = Envelope::new(id, message, self.return_address.clone(), target_address.clone());

        // Fast path: non-blocking enqueue while the lane has capacity.
        match target_address.try_enqueue(envelope.clone()) {
            Ok(()) => return Ok(()),
            Err(MessageError::MailboxFull) => {
                // Lane is full, fall through to the waiting path below.
            }
            Err(e) => return Err(e),
        }

        // Slow path: wait for lane capacity, bailing out on cancellation.
        let cancellation = self.cancellation_token.clone();
        let target_address = target_address.clone();
        Box::pin(async move {
            tokio::select! {
                () = cancellation.cancelled() => {
                    Err(MessageError::Cancelled)
                }
                enqueued = target_address.enqueue(envelope) => enqueued,
            }
        })
        .await
    }

    /// Registers this envelope's message for delivery after `delay`.
    ///
    /// Exactly one timer entry is registered with the clock; nothing is
    /// enqueued at call time. A zero (or elapsed) delay delivers at the
    /// next scheduling opportunity, not synchronously in the caller.
    #[instrument(skip(self, message), level = "trace", fields(message_type = std::any::type_name_of_val(&message)))]
    pub fn delayed_send(&self, delay: Duration, message: impl HeraldMessage + 'static) {
        let deadline = self.clock.now() + delay;
        self.scheduled_send(deadline, message);
    }

    /// Registers this envelope's message for delivery at `deadline`.
    ///
    /// A deadline already in the past delivers at the next scheduling
    /// opportunity.
    #[instrument(skip(self, message), level = "trace", fields(message_type = std::any::type_name_of_val(&message)))]
    pub fn scheduled_send(&self, deadline: Instant, message: impl HeraldMessage + 'static) {
        let Some(target_address) = self.recipient_address.as_ref() else {
            trace!("Envelope has no recipient; nothing to schedule");
            return;
        };
        if self.cancellation_token.is_cancelled() {
            error!(recipient = %target_address.sender, "Scheduled send aborted: cancellation_token triggered");
            return;
        }
        let id = self.next_message_id(Priority::Normal);
        let envelope = Envelope::new(
            id,
            Arc::new(message),
            self.return_address.clone(),
            target_address.clone(),
        );
        self.clock
            .schedule_message(deadline, target_address.clone(), envelope);
    }
}
