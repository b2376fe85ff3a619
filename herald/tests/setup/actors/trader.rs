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

use herald::prelude::*;

use crate::setup::messages::{Ping, Quote};

/// A statically typed quote consumer: accepts [`Quote`] responses and the
/// [`Ping`] messages tests use to trigger it.
///
/// The `desk` handle is used only by the dynamically typed fallback
/// tests; the typed tests capture a [`TypedHandle`] in their handlers.
#[derive(Default, Debug)]
pub struct Trader {
    pub quotes: Arc<Mutex<Vec<u64>>>,
    pub desk: AgentHandle,
}

impl Protocol for Trader {}

impl Accepts<Quote> for Trader {
    type Response = NoResponse;
}

impl Accepts<Ping> for Trader {
    type Response = NoResponse;
}
