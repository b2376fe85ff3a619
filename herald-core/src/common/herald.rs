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

use crate::common::AgentRuntime;

/// Represents the Herald system.
///
/// The `HeraldApp` struct serves as the entry point of the Herald
/// framework, preparing the runtime for operation.
#[derive(Default, Debug, Clone)]
pub struct HeraldApp;

impl HeraldApp {
    /// Launches the Herald system.
    ///
    /// This initializes the shared scheduling clock and returns a runtime
    /// ready to spawn agents and resolve named groups.
    ///
    /// # Returns
    ///
    /// An [`AgentRuntime`] instance indicating that the system has been
    /// successfully launched and is ready for operation.
    pub fn launch() -> AgentRuntime {
        let system: HeraldApp = Default::default();
        system.into()
    }
}
