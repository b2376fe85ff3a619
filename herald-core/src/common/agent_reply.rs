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
use std::pin::Pin;

/// A utility struct for creating `act_on` handler return futures.
pub struct AgentReply;

impl AgentReply {
    /// Creates a no-op future that completes immediately.
    ///
    /// Useful for handlers that finish their work synchronously but must
    /// still return a future.
    pub fn immediate() -> Pin<Box<impl Future<Output = ()> + Sized>> {
        Box::pin(async move {})
    }

    /// Wraps a future in a pinned box, the return shape `act_on`
    /// handlers require.
    pub fn from_async<F>(future: F) -> Pin<Box<F>>
    where
        F: Future<Output = ()> + Sized,
    {
        Box::pin(future)
    }
}
