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

pub use agent_handle::AgentHandle;
pub use agent_reply::AgentReply;
pub use agent_runtime::AgentRuntime;
pub use clock::AgentClock;
pub use config::HeraldConfig;
pub(crate) use config::HERALD_CONFIG;
pub use group::GroupHandle;
pub use herald::HeraldApp;
pub use pending::PendingRequests;
pub use typed_handle::{TypedContext, TypedHandle};
pub use types::ParentRef;
pub(crate) use types::{AgentSender, AsyncLifecycleHandler, FutureBox, ReactorItem, ReactorMap};

mod agent_handle;
mod agent_reply;
mod agent_runtime;
mod clock;
mod config;
mod group;
mod herald;
mod herald_inner;
pub(crate) mod mailbox;
mod pending;
mod typed_handle;
mod types;
