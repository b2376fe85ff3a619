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

use std::sync::Arc;
use std::time::SystemTime;

use static_assertions::assert_impl_all;

use crate::message::message_address::MessageAddress;
use crate::message::message_id::{MessageId, Priority};
use crate::traits::HeraldMessage;

/// The immutable unit of one message transmission.
///
/// An envelope is built exactly once per send call. Its identifier and
/// payload never change after construction; only its position in the
/// destination mailbox (or in the clock's pending set) does. A `reply_to`
/// of `None` marks an anonymous origin: the recipient has no resolvable
/// sender to answer.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// The identifier minted for this transmission.
    pub id: MessageId,
    /// The message contained in the envelope.
    pub message: Arc<dyn HeraldMessage + Send + Sync + 'static>,
    /// The time when the message was sent.
    pub timestamp: SystemTime,
    /// The return address for the message response, if the sender has one.
    pub reply_to: Option<MessageAddress>,
    /// The destination this envelope was addressed to.
    pub recipient: MessageAddress,
    /// Forwarding stages a multi-hop request still has to visit. Empty
    /// for plain sends.
    pub(crate) stages: Vec<MessageAddress>,
}

impl Envelope {
    /// Creates a new envelope with the specified id, message, sender, and
    /// recipient. The reply-stage chain starts empty.
    pub(crate) fn new(
        id: MessageId,
        message: Arc<dyn HeraldMessage + Send + Sync + 'static>,
        reply_to: Option<MessageAddress>,
        recipient: MessageAddress,
    ) -> Self {
        let timestamp = SystemTime::now();
        Envelope {
            id,
            message,
            timestamp,
            reply_to,
            recipient,
            stages: Vec::new(),
        }
    }

    /// The delivery priority encoded in the envelope id.
    pub fn priority(&self) -> Priority {
        self.id.priority()
    }

    /// Forwarding stages still to visit.
    #[allow(dead_code)]
    pub(crate) fn stages(&self) -> &[MessageAddress] {
        &self.stages
    }
}

// Ensures that Envelope implements the Send trait.
assert_impl_all!(Envelope: Send);
