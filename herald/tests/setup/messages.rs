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

//! Messages shared by the integration tests.

use herald::prelude::*;

/// Kicks off a test interaction.
#[herald_message]
pub struct Ping;

/// Sent between agents in the dynamic messaging tests.
#[herald_message]
pub struct Pong;

/// The reply to a [`Pong`] in the dynamic messaging tests.
#[herald_message]
pub struct PongResponse(pub i8);

/// A tagged payload the recorder agent keeps in arrival order.
#[herald_message]
pub struct Tag(pub u32);

/// Typed request for a price quote.
#[herald_message]
pub struct GetQuote(pub u32);

/// Typed response carrying the quoted price.
#[herald_message]
pub struct Quote(pub u64);

/// Broadcast to every member of an audit group.
#[herald_message]
pub struct AuditTick(pub u32);
