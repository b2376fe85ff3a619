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

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{instrument, trace, warn};

use crate::common::group::GroupHandle;
use crate::common::pending::ReplyPayload;
use crate::message::{Envelope, MessageAddress, Priority};

/// The scheduling clock shared by one agent runtime.
///
/// Every delayed or scheduled send registers exactly one entry here; the
/// entry fires once at (or after) its deadline and hands the envelope to
/// the destination's mailbox, or is dropped undelivered when the clock is
/// torn down first. Registration is thread-safe and fire-and-forget: the
/// caller never waits on the timer.
///
/// Cloning an `AgentClock` yields another reference to the same clock.
#[derive(Debug, Clone)]
pub struct AgentClock {
    tracker: TaskTracker,
    cancellation: CancellationToken,
    registered: Arc<AtomicU64>,
    pending: Arc<AtomicU64>,
}

impl Default for AgentClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentClock {
    /// Creates a fresh clock with no registrations.
    pub fn new() -> Self {
        AgentClock {
            tracker: TaskTracker::new(),
            cancellation: CancellationToken::new(),
            registered: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The clock's current reading.
    pub fn now(&self) -> Instant {
        Instant::now()
    }

    /// Total number of registrations this clock has accepted.
    pub fn registered_count(&self) -> u64 {
        self.registered.load(Ordering::Relaxed)
    }

    /// Number of registrations that have not yet fired or been dropped.
    pub fn pending_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Registers `envelope` for delivery to `recipient` at `deadline`.
    ///
    /// A deadline at or before [`now`](Self::now) fires at the next
    /// scheduling opportunity, never synchronously in the caller.
    #[instrument(skip(self, recipient, envelope), fields(recipient = %recipient.sender, id = %envelope.id))]
    pub(crate) fn schedule_message(
        &self,
        deadline: Instant,
        recipient: MessageAddress,
        envelope: Envelope,
    ) {
        if self.cancellation.is_cancelled() {
            warn!("Clock is shut down; discarding envelope");
            return;
        }
        self.registered.fetch_add(1, Ordering::Relaxed);
        self.pending.fetch_add(1, Ordering::Relaxed);
        let cancellation = self.cancellation.clone();
        let pending = self.pending.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                () = cancellation.cancelled() => {
                    trace!(id = %envelope.id, "Clock torn down; envelope dropped undelivered");
                }
                () = sleep_until(deadline) => {
                    if let Err(e) = recipient.enqueue(envelope).await {
                        warn!(recipient = %recipient.sender, error = %e, "Scheduled delivery failed");
                    }
                }
            }
            pending.fetch_sub(1, Ordering::Relaxed);
        });
    }

    /// Registers a group fan-out of `message` at `deadline`.
    ///
    /// Membership is read when the timer fires, not at registration.
    #[instrument(skip(self, group, sender, message))]
    pub(crate) fn schedule_group_message(
        &self,
        deadline: Instant,
        group: GroupHandle,
        sender: Option<MessageAddress>,
        priority: Priority,
        message: ReplyPayload,
    ) {
        if self.cancellation.is_cancelled() {
            warn!("Clock is shut down; discarding group message");
            return;
        }
        self.registered.fetch_add(1, Ordering::Relaxed);
        self.pending.fetch_add(1, Ordering::Relaxed);
        let cancellation = self.cancellation.clone();
        let pending = self.pending.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                () = cancellation.cancelled() => {
                    trace!("Clock torn down; group message dropped undelivered");
                }
                () = sleep_until(deadline) => {
                    group.fan_out(sender, priority, message).await;
                }
            }
            pending.fetch_sub(1, Ordering::Relaxed);
        });
    }

    /// Tears the clock down: every registration that has not fired is
    /// dropped undelivered.
    pub(crate) async fn shutdown(&self) {
        self.cancellation.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
