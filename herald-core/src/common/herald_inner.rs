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

use acton_ern::Ern;
use dashmap::DashMap;

use crate::common::clock::AgentClock;
use crate::common::{AgentHandle, GroupHandle};

/// Crate-internal shared state of one launched runtime: the root agents,
/// the named groups, and the scheduling clock they all share.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeraldInner {
    pub(crate) roots: DashMap<Ern, AgentHandle>,
    pub(crate) groups: DashMap<String, GroupHandle>,
    pub(crate) clock: AgentClock,
}
