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

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::trace;

use crate::traits::HeraldMessage;

/// The type-erased payload a resolved request yields.
pub(crate) type ReplyPayload = Arc<dyn HeraldMessage + Send + Sync + 'static>;

/// Registry of requests an agent has in flight, keyed by correlation
/// sequence.
///
/// An entry is registered before its request is dispatched and removed on
/// the first matching response, which is what makes resolution
/// exactly-once: a second response with the same correlation finds no
/// entry and is reported as spurious by the caller. Entries for timed-out
/// requests are discarded the same way.
#[derive(Debug, Clone, Default)]
pub struct PendingRequests {
    entries: Arc<DashMap<u64, oneshot::Sender<ReplyPayload>>>,
}

impl PendingRequests {
    /// Registers a correlation and returns the receiver its response will
    /// resolve.
    pub(crate) fn register(&self, correlation: u64) -> oneshot::Receiver<ReplyPayload> {
        let (resolver, receiver) = oneshot::channel();
        self.entries.insert(correlation, resolver);
        receiver
    }

    /// Resolves the entry for `correlation` with `payload`.
    ///
    /// Returns `false` when no entry exists: the response is spurious
    /// (already resolved, timed out, or never requested here) and the
    /// caller decides how to report it.
    pub(crate) fn resolve(&self, correlation: u64, payload: ReplyPayload) -> bool {
        match self.entries.remove(&correlation) {
            Some((_, resolver)) => {
                if resolver.send(payload).is_err() {
                    // The requester gave up (future dropped) before the
                    // response arrived; the entry is consumed either way.
                    trace!(correlation, "Requester no longer awaits this response");
                }
                true
            }
            None => false,
        }
    }

    /// Removes the entry for `correlation` without resolving it, e.g.
    /// when the request timed out. Returns whether an entry existed.
    pub(crate) fn discard(&self, correlation: u64) -> bool {
        self.entries.remove(&correlation).is_some()
    }

    /// Number of requests currently awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.entries.len()
    }
}
