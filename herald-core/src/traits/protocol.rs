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

use std::marker::PhantomData;

use crate::traits::HeraldMessage;

/// Marker trait for a statically typed agent interface.
///
/// A model type that implements `Protocol` declares, through [`Accepts`]
/// implementations, the exact set of message shapes the agent handles and
/// the response each one produces. Agents whose model does not implement
/// `Protocol` are dynamically typed: their accepted shapes are resolved at
/// delivery time and they communicate through the unchecked primitives
/// (`anon_send` and the dynamic envelope API).
pub trait Protocol: Send + Sync + 'static {}

/// Declares that protocol `Self` accepts messages of type `M`.
///
/// The associated [`Response`](Accepts::Response) names the reply the
/// destination produces for `M`: either [`NoResponse`] or
/// [`Responds<R>`](Responds).
///
/// ```
/// use herald_core::prelude::*;
///
/// #[derive(Clone, Debug)]
/// struct GetQuote(String);
/// #[derive(Clone, Debug)]
/// struct Quote(u64);
///
/// struct PricingDesk;
/// impl Protocol for PricingDesk {}
/// impl Accepts<GetQuote> for PricingDesk {
///     type Response = Responds<Quote>;
/// }
/// ```
pub trait Accepts<M>: Protocol
where
    M: HeraldMessage,
{
    /// The reply shape this protocol produces for `M`.
    type Response;
}

/// Reply shape for a message that produces no response.
///
/// Deliberately not `Clone`: `NoResponse` is a type-level marker, never a
/// payload, and must not satisfy [`HeraldMessage`].
#[derive(Debug)]
pub struct NoResponse;

/// Reply shape for a message answered with a payload of type `R`.
#[derive(Debug)]
pub struct Responds<R>(PhantomData<fn(R) -> R>);

/// The reply-flows-back check of the typed send facade.
///
/// A reply shape is acceptable to sender protocol `S` when it is
/// [`NoResponse`], or when it is [`Responds<R>`](Responds) and `S` itself
/// accepts `R` as an input. A statically typed agent can therefore never
/// issue a send whose eventual reply its own interface cannot handle.
///
/// The check looks exactly one hop ahead: it validates the direct reply,
/// not a chain of forwarded requests.
// TODO: the response check only looks one hop forward; a forwarded request
// chain that eventually cycles back is not rejected.
pub trait AcceptableTo<S: Protocol> {}

impl<S: Protocol> AcceptableTo<S> for NoResponse {}

impl<S, R> AcceptableTo<S> for Responds<R>
where
    R: HeraldMessage,
    S: Protocol + Accepts<R>,
{
}

/// Compile-time probe for the typed send bounds.
///
/// Instantiating `check_typed_send::<S, D, M>` is exactly the constraint
/// the typed facade places on a send of `M` from an agent speaking
/// protocol `S` to a destination speaking protocol `D`. It produces no
/// code; it exists so the gate can be exercised (and demonstrated to
/// fail) independently of a running agent system.
///
/// Accepted shape, reply handled by the sender:
///
/// ```
/// use herald_core::prelude::*;
///
/// #[derive(Clone, Debug)]
/// struct GetQuote(String);
/// #[derive(Clone, Debug)]
/// struct Quote(u64);
///
/// struct Trader;
/// impl Protocol for Trader {}
/// impl Accepts<Quote> for Trader {
///     type Response = NoResponse;
/// }
///
/// struct PricingDesk;
/// impl Protocol for PricingDesk {}
/// impl Accepts<GetQuote> for PricingDesk {
///     type Response = Responds<Quote>;
/// }
///
/// check_typed_send::<Trader, PricingDesk, GetQuote>();
/// ```
///
/// A destination that does not accept the message shape is rejected at
/// compile time:
///
/// ```compile_fail
/// use herald_core::prelude::*;
///
/// #[derive(Clone, Debug)]
/// struct GetQuote(String);
/// #[derive(Clone, Debug)]
/// struct Unrelated;
///
/// struct Trader;
/// impl Protocol for Trader {}
///
/// struct PricingDesk;
/// impl Protocol for PricingDesk {}
/// impl Accepts<GetQuote> for PricingDesk {
///     type Response = NoResponse;
/// }
///
/// // PricingDesk has no `Accepts<Unrelated>` implementation.
/// check_typed_send::<Trader, PricingDesk, Unrelated>();
/// ```
///
/// So is a sender that could not handle the reply it is asking for:
///
/// ```compile_fail
/// use herald_core::prelude::*;
///
/// #[derive(Clone, Debug)]
/// struct GetQuote(String);
/// #[derive(Clone, Debug)]
/// struct Quote(u64);
///
/// // Trader does not accept Quote, so it must not be able to send
/// // GetQuote, whose reply is a Quote.
/// struct Trader;
/// impl Protocol for Trader {}
///
/// struct PricingDesk;
/// impl Protocol for PricingDesk {}
/// impl Accepts<GetQuote> for PricingDesk {
///     type Response = Responds<Quote>;
/// }
///
/// check_typed_send::<Trader, PricingDesk, GetQuote>();
/// ```
pub fn check_typed_send<S, D, M>()
where
    S: Protocol,
    M: HeraldMessage,
    D: Accepts<M>,
    D::Response: AcceptableTo<S>,
{
}
