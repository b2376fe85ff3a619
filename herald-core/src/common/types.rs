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

//! Defines common internal type aliases and supporting structures used
//! within `herald-core`.
//!
//! This module centralizes type definitions for futures, handlers, and
//! channels to improve code readability and maintainability. It also
//! defines public type aliases for specific uses of [`AgentHandle`].

use std::any::TypeId;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use dashmap::DashMap;

use crate::actor::{ManagedAgent, Started};
use crate::common::mailbox::MailboxSender;
use crate::common::AgentHandle;
use crate::message::Envelope;

/// Crate-internal: Map storing message handlers (`TypeId` -> `ReactorItem`).
pub(crate) type ReactorMap<AgentModel> = DashMap<TypeId, ReactorItem<AgentModel>>;

/// Crate-internal: Enum wrapping the supported kinds of message handlers.
pub(crate) enum ReactorItem<AgentModel: Default + Send + Debug + 'static> {
    /// A handler that processes a message and returns a future.
    FutureReactor(Box<FutureHandler<AgentModel>>),
}

/// Crate-internal: Type alias for the function signature of a message
/// handler that returns a future.
pub(crate) type FutureHandler<AgentModel> = dyn for<'a, 'b> Fn(
        &'a mut ManagedAgent<Started, AgentModel>,
        &'b mut Envelope,
    ) -> FutureBox
    + Send
    + Sync
    + 'static;

/// Crate-internal: Type alias for a pinned, boxed, dynamically dispatched
/// future with `Output = ()`. This is the required return type for
/// asynchronous message handlers (`act_on`).
pub(crate) type FutureBox = Pin<Box<dyn Future<Output = ()> + Send + Sync + 'static>>;

/// Crate-internal: Type alias for the sender half of an agent's mailbox.
pub(crate) type AgentSender = MailboxSender;

/// Crate-internal: Type alias for the function signature of an
/// asynchronous lifecycle hook.
pub(crate) type AsyncLifecycleHandler<AgentModel> =
    Box<dyn Fn(&ManagedAgent<Started, AgentModel>) -> FutureBox + Send + Sync + 'static>;

// --- Public Type Aliases ---

/// A type alias representing a handle ([`AgentHandle`]) specifically for
/// an agent's parent (supervisor).
///
/// This alias provides semantic clarity in hierarchical agent structures,
/// indicating that the handle refers to the agent responsible for
/// supervising the current one.
pub type ParentRef = AgentHandle;
