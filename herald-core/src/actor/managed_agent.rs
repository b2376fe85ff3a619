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
use std::fmt::Debug;
use std::fmt::Formatter;

use acton_ern::Ern;
use tokio_util::task::TaskTracker;

pub use idle::Idle;

use crate::common::mailbox::Mailbox;
use crate::common::{AgentHandle, AgentRuntime, AsyncLifecycleHandler, ParentRef, ReactorMap};

mod idle;
pub mod started;

/// An agent managed by the Herald runtime, parameterized by its
/// type-state (`Idle` until started, `Started` once its message loop
/// runs) and by the user-defined model it wraps.
pub struct ManagedAgent<AgentState, Model: Default + Send + Debug + 'static> {
    pub handle: AgentHandle,

    pub parent: Option<ParentRef>,

    pub id: Ern,
    pub runtime: AgentRuntime,

    pub model: Model,

    pub(crate) tracker: TaskTracker,

    pub(crate) inbox: Mailbox,
    /// Hook called before the agent starts listening for messages.
    pub(crate) before_start: AsyncLifecycleHandler<Model>,
    /// Hook called when the agent wakes up, before the first message.
    pub(crate) after_start: AsyncLifecycleHandler<Model>,
    /// Hook called just before the agent stops listening for messages.
    pub(crate) before_stop: AsyncLifecycleHandler<Model>,
    /// Hook called when the agent has stopped listening for messages.
    pub(crate) after_stop: AsyncLifecycleHandler<Model>,
    /// Map of reactors for handling different message types.
    pub(crate) reactors: ReactorMap<Model>,
    _agent_state: std::marker::PhantomData<AgentState>,
}

impl<AgentState, Model: Default + Send + Debug + 'static> Debug
    for ManagedAgent<AgentState, Model>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedAgent").field("id", &self.id).finish()
    }
}
