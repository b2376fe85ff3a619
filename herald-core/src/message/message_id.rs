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

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Delivery priority of a message.
///
/// High-priority envelopes become eligible for delivery before
/// normal-priority envelopes already waiting in the same mailbox,
/// regardless of arrival order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Default delivery lane.
    #[default]
    Normal,
    /// Overtakes normal-priority envelopes waiting in the same mailbox.
    High,
}

/// Monotonic source for correlation sequences. Zero is never minted.
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

const RESPONSE_FLAG: u64 = 1 << 63;
const REQUEST_FLAG: u64 = 1 << 62;
const HIGH_PRIORITY_FLAG: u64 = 1 << 61;
const SEQUENCE_MASK: u64 = (1 << 48) - 1;

/// Identifier minted once per send.
///
/// The high bits carry the delivery priority and the request/response
/// markers; the low 48 bits carry a monotonically assigned sequence used
/// to correlate a response with its originating request. A `MessageId`
/// is immutable after minting: turning a request id into the id of its
/// response produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(u64);

impl MessageId {
    /// Mints the id for a one-way message with the given priority.
    pub fn of(priority: Priority) -> Self {
        Self::mint(priority, false)
    }

    /// Mints the id for a message that expects exactly one response.
    pub fn request(priority: Priority) -> Self {
        Self::mint(priority, true)
    }

    fn mint(priority: Priority, expects_response: bool) -> Self {
        let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed) & SEQUENCE_MASK;
        let mut bits = sequence;
        if matches!(priority, Priority::High) {
            bits |= HIGH_PRIORITY_FLAG;
        }
        if expects_response {
            bits |= REQUEST_FLAG;
        }
        MessageId(bits)
    }

    /// Returns the id a response to this request must carry.
    ///
    /// The correlation sequence and priority are preserved; the request
    /// marker is replaced by the response marker.
    #[must_use]
    pub fn response_id(self) -> Self {
        MessageId((self.0 & !REQUEST_FLAG) | RESPONSE_FLAG)
    }

    /// The delivery priority encoded in this id.
    pub fn priority(self) -> Priority {
        if self.0 & HIGH_PRIORITY_FLAG != 0 {
            Priority::High
        } else {
            Priority::Normal
        }
    }

    /// Whether the sender of this message awaits a response.
    pub fn is_request(self) -> bool {
        self.0 & REQUEST_FLAG != 0
    }

    /// Whether this message is the response to an earlier request.
    pub fn is_response(self) -> bool {
        self.0 & RESPONSE_FLAG != 0
    }

    /// The correlation sequence shared by a request and its response.
    pub fn correlation(self) -> u64 {
        self.0 & SEQUENCE_MASK
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_response() {
            "response"
        } else if self.is_request() {
            "request"
        } else {
            "async"
        };
        write!(f, "{}#{}/{:?}", kind, self.correlation(), self.priority())
    }
}
