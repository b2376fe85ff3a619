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

use std::future::Future;

use acton_ern::Ern;
use async_trait::async_trait;
use dashmap::DashMap;
use tokio_util::task::TaskTracker;

use crate::common::AgentHandle;
use crate::message::{MessageAddress, OutboundEnvelope};

/// Trait for agent handles, defining common methods for agent interaction.
#[async_trait]
pub trait AgentHandleInterface {
    /// Returns the agent's addressable endpoint.
    fn reply_address(&self) -> MessageAddress;

    /// Returns an envelope originating from this agent, optionally
    /// pre-addressed to a recipient, ready to send.
    fn create_envelope(&self, recipient_address: Option<MessageAddress>) -> OutboundEnvelope;

    /// Returns a map of the agent's children.
    fn children(&self) -> DashMap<String, AgentHandle>;

    /// Finds a child agent by its ERN.
    fn find_child(&self, ern: &Ern) -> Option<AgentHandle>;

    /// Returns the agent's task tracker.
    fn tracker(&self) -> TaskTracker;

    /// Returns the agent's ERN.
    fn id(&self) -> Ern;

    /// Returns the root name of the agent.
    fn name(&self) -> String;

    /// Creates a clone of the agent's handle.
    fn clone_ref(&self) -> AgentHandle;

    /// Stops the agent, draining its mailbox before shutdown.
    fn stop(&self) -> impl Future<Output = anyhow::Result<()>> + Send + Sync + '_;
}
