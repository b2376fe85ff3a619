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

//! Testing utilities for Herald agents.
//!
//! The [`herald_test`](herald_test_macro::herald_test) attribute runs an
//! async test body on a multi-threaded Tokio runtime and surfaces panics
//! from spawned agent tasks as test failures.

// Re-exported for use inside the generated test wrapper.
pub use parking_lot;

/// Prelude module for convenient imports in test code.
pub mod prelude {
    pub use herald_test_macro::herald_test;

    pub use crate::parking_lot;
}
