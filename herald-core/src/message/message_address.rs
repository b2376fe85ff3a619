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

use acton_ern::prelude::*;
use derive_new::new;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::common::{mailbox, AgentSender, PendingRequests};
use crate::message::{Envelope, MessageError};

/// Represents the addressable endpoint of an agent: its identity, its
/// mailbox, and its pending-request registry.
///
/// A `MessageAddress` is the shared control-block reference every holder
/// of an agent handle or envelope carries. Cloning it never clones agent
/// state; it only bumps the reference counts of the underlying channels
/// and registries. The address stays valid after the agent has stopped;
/// enqueuing into a stopped agent fails with
/// [`MessageError::ChannelClosed`].
#[derive(new, Clone, Debug)]
pub struct MessageAddress {
    /// The two-lane sender half of the agent's mailbox.
    pub(crate) address: AgentSender,
    /// The unique identifier (`Ern`) of the agent associated with this address.
    pub(crate) sender: Ern,
    /// The registry of requests this agent has in flight.
    pub(crate) pending: PendingRequests,
    /// The cancellation token of the agent behind this address.
    pub(crate) cancellation_token: CancellationToken,
}

impl MessageAddress {
    /// Returns the root name component of the agent's identifier (`Ern`).
    #[inline]
    pub fn name(&self) -> &str {
        self.sender.root.as_str()
    }

    /// Whether the agent behind this address can still receive envelopes.
    pub fn is_alive(&self) -> bool {
        !self.address.is_closed() && !self.cancellation_token.is_cancelled()
    }

    /// Hands one envelope to the agent behind this address.
    ///
    /// Response envelopes never enter the mailbox: they resolve the
    /// matching pending-request entry right here at the mailbox edge, so
    /// an agent awaiting its own request can never deadlock its message
    /// loop. Everything else is enqueued into the lane selected by the
    /// envelope's priority, waiting for lane capacity if the mailbox is
    /// full.
    ///
    /// Safe to call concurrently from any number of senders; the lanes
    /// are the sole synchronization point.
    pub(crate) async fn enqueue(&self, envelope: Envelope) -> Result<(), MessageError> {
        if envelope.id.is_response() {
            self.resolve_response(envelope);
            return Ok(());
        }
        let lane = self.address.lane(envelope.priority());

        // Fast path: non-blocking reserve when the lane has capacity.
        match lane.try_reserve() {
            Ok(permit) => {
                permit.send(envelope);
                return Ok(());
            }
            Err(tokio::sync::mpsc::error::TrySendError::Closed(())) => {
                return Err(MessageError::ChannelClosed);
            }
            Err(tokio::sync::mpsc::error::TrySendError::Full(())) => {
                // Lane is full, fall through to the waiting path.
            }
        }

        match lane.reserve().await {
            Ok(permit) => {
                permit.send(envelope);
                Ok(())
            }
            Err(e) => Err(MessageError::SendFailed(e.to_string())),
        }
    }

    /// Non-blocking variant of [`enqueue`](Self::enqueue); a full lane is
    /// reported instead of awaited.
    pub(crate) fn try_enqueue(&self, envelope: Envelope) -> Result<(), MessageError> {
        if envelope.id.is_response() {
            self.resolve_response(envelope);
            return Ok(());
        }
        let lane = self.address.lane(envelope.priority());
        match lane.try_reserve() {
            Ok(permit) => {
                permit.send(envelope);
                Ok(())
            }
            Err(tokio::sync::mpsc::error::TrySendError::Closed(())) => {
                Err(MessageError::ChannelClosed)
            }
            Err(tokio::sync::mpsc::error::TrySendError::Full(())) => Err(MessageError::MailboxFull),
        }
    }

    fn resolve_response(&self, envelope: Envelope) {
        let correlation = envelope.id.correlation();
        trace!(
            recipient = %self.sender,
            id = %envelope.id,
            "Resolving response at the mailbox edge"
        );
        if !self.pending.resolve(correlation, envelope.message) {
            // Either the request timed out or the id never existed here;
            // a stale response is discarded, not an error.
            warn!(
                recipient = %self.sender,
                correlation,
                "Discarding spurious response with no pending request"
            );
        }
    }
}

impl PartialEq for MessageAddress {
    /// Addresses are equal when they refer to the same agent identity.
    fn eq(&self, other: &Self) -> bool {
        self.sender == other.sender
    }
}

impl Default for MessageAddress {
    /// Creates a default `MessageAddress` with a default `Ern` and closed
    /// mailbox lanes.
    ///
    /// This is primarily useful for placeholder initialization before a
    /// real address is known. Messages cannot be delivered through the
    /// default address.
    fn default() -> Self {
        let (outbox, inbox) = mailbox::channel(crate::common::HERALD_CONFIG.limits.dummy_channel_size);
        drop(inbox);
        Self::new(
            outbox,
            Ern::default(),
            PendingRequests::default(),
            CancellationToken::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_address_is_unreachable() {
        let address = MessageAddress::default();
        assert!(!address.is_alive());
    }
}
