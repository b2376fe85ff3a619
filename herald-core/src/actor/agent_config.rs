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

use acton_ern::{Ern, ErnParser};

use crate::common::ParentRef;
use crate::traits::AgentHandleInterface;

/// Configuration for creating an agent.
///
/// This struct holds the necessary information to configure an agent:
/// its ERN (Entity Resource Name) and an optional parent reference.
#[derive(Default, Debug, Clone)]
pub struct AgentConfig {
    ern: Ern,
    parent: Option<ParentRef>,
}

impl AgentConfig {
    /// Creates a new `AgentConfig` instance.
    ///
    /// When a parent is given, the agent's ERN is composed beneath the
    /// parent's.
    pub fn new(ern: Ern, parent: Option<ParentRef>) -> anyhow::Result<AgentConfig> {
        if let Some(parent) = parent {
            let parent_ern = ErnParser::new(parent.id().to_string()).parse()?;
            let child_ern = parent_ern + ern;
            Ok(AgentConfig {
                ern: child_ern,
                parent: Some(parent),
            })
        } else {
            Ok(AgentConfig { ern, parent })
        }
    }

    /// Creates a new config with an ERN root of the provided name.
    pub fn new_with_name(name: impl Into<String>) -> anyhow::Result<AgentConfig> {
        Self::new(Ern::with_root(name.into())?, None)
    }

    /// Returns the ERN of the agent.
    pub(crate) fn ern(&self) -> Ern {
        self.ern.clone()
    }

    /// Returns a reference to the optional parent.
    pub(crate) fn parent(&self) -> &Option<ParentRef> {
        &self.parent
    }
}
