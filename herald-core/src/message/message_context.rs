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

use std::time::SystemTime;

use static_assertions::assert_impl_all;

use crate::message::{MessageAddress, MessageId, OutboundEnvelope, Priority};

/// The handler-side view of one received message.
///
/// # Type Parameters
/// - `M`: The concrete type of the received message.
#[derive(Clone, Debug)]
pub struct MessageContext<M> {
    /// The message contained in the event.
    pub(crate) message: M,
    /// The time when the message was sent.
    pub(crate) timestamp: SystemTime,
    /// The identifier the envelope carried.
    pub(crate) id: MessageId,
    /// An envelope describing the original sender-to-recipient direction.
    pub(crate) origin_envelope: OutboundEnvelope,
    /// An envelope pre-addressed back to the sender. Carries the request
    /// correlation when the sender awaits a response; sends through it
    /// no-op when the origin was anonymous.
    pub(crate) reply_envelope: OutboundEnvelope,
}

impl<M> MessageContext<M> {
    pub fn origin_envelope(&self) -> &OutboundEnvelope {
        &self.origin_envelope
    }

    pub fn reply_envelope(&self) -> &OutboundEnvelope {
        &self.reply_envelope
    }

    pub fn message(&self) -> &M {
        &self.message
    }

    pub fn timestamp(&self) -> &SystemTime {
        &self.timestamp
    }

    /// The identifier minted for this transmission.
    pub fn message_id(&self) -> MessageId {
        self.id
    }

    /// The delivery priority the envelope carried.
    pub fn priority(&self) -> Priority {
        self.id.priority()
    }

    /// Whether the sender awaits exactly one response to this message.
    pub fn expects_response(&self) -> bool {
        self.id.is_request()
    }

    /// Returns an envelope from the receiving agent to `recipient`,
    /// ready to send.
    pub fn new_envelope(&self, recipient: &MessageAddress) -> OutboundEnvelope {
        OutboundEnvelope::new_with_recipient(
            self.reply_envelope.return_address.clone(),
            Some(recipient.clone()),
            self.reply_envelope.clock.clone(),
            self.reply_envelope.cancellation_token.clone(),
        )
    }
}

// Ensures that MessageContext<u32> implements the Send trait.
assert_impl_all!(MessageContext<u32>: Send);
