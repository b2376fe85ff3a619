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

use std::sync::{Arc, Mutex};

/// Records the tags it receives in arrival order.
///
/// The shared `seen` vector lets a test keep a clone of the handle to the
/// recording and assert on it after the agent has stopped.
#[derive(Default, Debug)]
pub struct Recorder {
    pub seen: Arc<Mutex<Vec<u32>>>,
}

impl Recorder {
    /// Records one tag.
    pub fn record(&self, tag: u32) {
        self.seen.lock().expect("recorder poisoned").push(tag);
    }
}
