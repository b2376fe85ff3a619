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
use std::time::Duration;

use acton_ern::Ern;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{instrument, trace, warn};

use crate::common::clock::AgentClock;
use crate::common::pending::ReplyPayload;
use crate::common::AgentHandle;
use crate::message::{Envelope, MessageAddress, MessageId, Priority};
use crate::traits::{AgentHandleInterface, HeraldMessage};

/// A named broadcast destination with runtime-only membership.
///
/// Group sends carry no type guarantee: every publish constructs one
/// generic envelope per current member and fans them out. Because the
/// membership (and therefore the accepted-signature set) is unknown until
/// delivery, the typed facade offers no group operation at all: a
/// statically typed agent reaches a group only through this unchecked
/// API, the same way it reaches dynamic agents through `anon_send`.
///
/// The handle is nullable: [`GroupHandle::null`] gives a handle whose
/// every publish is a silent no-op.
#[derive(Debug, Clone, Default)]
pub struct GroupHandle {
    inner: Option<Arc<GroupInner>>,
}

#[derive(Debug)]
struct GroupInner {
    id: Ern,
    members: DashMap<Ern, MessageAddress>,
    clock: AgentClock,
}

impl GroupHandle {
    pub(crate) fn new(id: Ern, clock: AgentClock) -> Self {
        GroupHandle {
            inner: Some(Arc::new(GroupInner {
                id,
                members: DashMap::new(),
                clock,
            })),
        }
    }

    /// A handle referring to no group; every publish through it is a
    /// silent no-op.
    pub fn null() -> Self {
        GroupHandle::default()
    }

    /// Whether this handle refers to a live group.
    pub fn is_alive(&self) -> bool {
        self.inner.is_some()
    }

    /// The group's identifier, if the handle is non-null.
    pub fn id(&self) -> Option<Ern> {
        self.inner.as_ref().map(|inner| inner.id.clone())
    }

    /// Number of current members.
    pub fn member_count(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |inner| inner.members.len())
    }

    /// Adds an addressable endpoint to the membership.
    #[instrument(skip(self, address), fields(member = %address.sender))]
    pub fn join(&self, address: MessageAddress) {
        let Some(inner) = &self.inner else {
            trace!("Join on a null group handle ignored");
            return;
        };
        inner.members.insert(address.sender.clone(), address);
    }

    /// Adds an agent to the membership.
    pub fn join_agent(&self, handle: &AgentHandle) {
        self.join(handle.reply_address());
    }

    /// Removes a member. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub fn leave(&self, id: &Ern) {
        if let Some(inner) = &self.inner {
            inner.members.remove(id);
        }
    }

    /// Fans `message` out to the current membership with normal priority
    /// and no sender identity.
    pub async fn publish(&self, message: impl HeraldMessage + 'static) {
        self.fan_out(None, Priority::Normal, Arc::new(message)).await;
    }

    /// Fans `message` out with the given priority and no sender identity.
    pub async fn publish_prioritized(
        &self,
        priority: Priority,
        message: impl HeraldMessage + 'static,
    ) {
        self.fan_out(None, priority, Arc::new(message)).await;
    }

    /// Fans `message` out, attaching `sender` so members can reply.
    pub async fn publish_from(
        &self,
        sender: MessageAddress,
        message: impl HeraldMessage + 'static,
    ) {
        self.fan_out(Some(sender), Priority::Normal, Arc::new(message))
            .await;
    }

    /// Registers a fan-out of `message` after `delay`. Membership is read
    /// when the timer fires.
    pub fn delayed_publish(&self, delay: Duration, message: impl HeraldMessage + 'static) {
        let Some(inner) = &self.inner else {
            trace!("Delayed publish on a null group handle ignored");
            return;
        };
        let deadline = inner.clock.now() + delay;
        inner.clock.schedule_group_message(
            deadline,
            self.clone(),
            None,
            Priority::Normal,
            Arc::new(message),
        );
    }

    /// Registers a fan-out of `message` at `deadline`. A deadline in the
    /// past fires at the next scheduling opportunity.
    pub fn scheduled_publish(&self, deadline: Instant, message: impl HeraldMessage + 'static) {
        let Some(inner) = &self.inner else {
            trace!("Scheduled publish on a null group handle ignored");
            return;
        };
        inner.clock.schedule_group_message(
            deadline,
            self.clone(),
            None,
            Priority::Normal,
            Arc::new(message),
        );
    }

    /// Crate-internal: one generic envelope per member, delivery failures
    /// logged per member.
    pub(crate) async fn fan_out(
        &self,
        sender: Option<MessageAddress>,
        priority: Priority,
        message: ReplyPayload,
    ) {
        let Some(inner) = &self.inner else {
            trace!("Publish on a null group handle ignored");
            return;
        };
        trace!(group = %inner.id, members = inner.members.len(), "Fanning out group message");
        let members: Vec<MessageAddress> = inner
            .members
            .iter()
            .map(|member| member.value().clone())
            .collect();
        for member in members {
            let envelope = Envelope::new(
                MessageId::of(priority),
                message.clone(),
                sender.clone(),
                member.clone(),
            );
            if let Err(e) = member.enqueue(envelope).await {
                warn!(group = %inner.id, member = %member.sender, error = %e, "Group delivery failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_group_ignores_membership_and_publishes() {
        let group = GroupHandle::null();
        assert!(!group.is_alive());
        assert_eq!(group.member_count(), 0);

        group.join(MessageAddress::default());
        assert_eq!(group.member_count(), 0);

        // No members, no panic, nothing delivered.
        group.publish("into the void").await;
    }

    #[tokio::test]
    async fn membership_changes_are_reflected() {
        let group = GroupHandle::new(Ern::with_root("traders").unwrap(), AgentClock::new());
        let member = MessageAddress::default();
        let id = member.sender.clone();

        group.join(member);
        assert_eq!(group.member_count(), 1);

        group.leave(&id);
        assert_eq!(group.member_count(), 0);
    }
}
