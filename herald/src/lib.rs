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

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

//! # Herald
//!
//! Herald is an asynchronous agent framework built on Tokio, centered on
//! its message-send and request/response core. Agents are reachable only
//! through handles; every interaction is an asynchronous message.
//!
//! ## Key Concepts
//!
//! - **Agents (`ManagedAgent`)**: computational units wrapping
//!   user-defined state, managed by the runtime with a type-state
//!   (`Idle`/`Started`) lifecycle.
//! - **Handles**: [`AgentHandle`](prelude::AgentHandle) for dynamically
//!   typed agents, [`TypedHandle`](prelude::TypedHandle) for agents whose
//!   model declares a [`Protocol`](prelude::Protocol). Typed handles are
//!   nullable; sends through a null handle are silent no-ops.
//! - **The type gate**: statically typed agents can only send shapes the
//!   destination declares, and only when they can handle the declared
//!   response themselves; violations fail to compile.
//! - **Priority delivery**: every envelope carries a
//!   [`Priority`](prelude::Priority) in its id; high-priority envelopes
//!   overtake normal ones waiting in the same mailbox.
//! - **Scheduled delivery**: `delayed_send` / `scheduled_send` register a
//!   timer with the runtime clock instead of enqueuing immediately.
//! - **Requests**: `request` pairs a send with a pending entry resolved
//!   exactly once by the matching response, or by a timeout.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! #[herald_message]
//! struct Greet {
//!     name: String,
//! }
//! ```

/// A prelude module for conveniently importing the most commonly used items.
///
/// Re-exports the Herald core types, the `herald-macro` attribute macros,
/// and the `acton-ern`, `async-trait`, and `tokio` crates test and
/// application code routinely need.
pub mod prelude {
    pub use herald_core::prelude::*;
    pub use herald_macro::*;
    pub use tokio;
}
