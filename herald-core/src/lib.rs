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

#![forbid(unsafe_code)]
//! Herald Core Library
//!
//! This library provides the message-send and request/response core of the
//! Herald actor framework: envelopes and message identifiers, the typed
//! send gate, clock-scheduled delivery, priority mailboxes, and the
//! pending-request correlation registry, together with the agent runtime
//! that consumes them.

/// Common utilities and structures used throughout the Herald framework.
pub(crate) mod common;

pub(crate) mod actor;
pub(crate) mod message;
/// Trait definitions used in the Herald framework.
pub(crate) mod traits;

/// Prelude module for convenient imports.
///
/// This module re-exports commonly used items from the `common`, `message`,
/// and `traits` modules, as well as the `async_trait` crate.
pub mod prelude {
    pub use acton_ern::*;
    pub use async_trait;

    pub use crate::actor::{AgentConfig, Idle, ManagedAgent, Started};
    pub use crate::common::{
        AgentClock, AgentHandle, AgentReply, AgentRuntime, GroupHandle, HeraldApp, TypedContext,
        TypedHandle,
    };
    pub use crate::message::{
        MessageAddress, MessageContext, MessageError, MessageId, OutboundEnvelope, Priority,
        RequestError, SystemSignal,
    };
    pub use crate::traits::{
        check_typed_send, AcceptableTo, Accepts, AgentHandleInterface, HeraldMessage, NoResponse,
        Protocol, Responds,
    };
}
