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

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use acton_ern::Ern;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, trace, warn};

use crate::common::clock::AgentClock;
use crate::common::{AgentHandle, HERALD_CONFIG};
use crate::message::{
    Envelope, MessageAddress, MessageId, OutboundEnvelope, Priority, RequestError,
};
use crate::traits::{AcceptableTo, Accepts, AgentHandleInterface, HeraldMessage, Protocol, Responds};

/// A statically typed handle to an agent speaking protocol `P`.
///
/// The handle is an explicit optional link: [`TypedHandle::null`] refers
/// to no agent at all, and every send through a null handle is a silent
/// no-op, so optional destinations can be written to without a
/// check. Liveness is queryable through [`is_alive`](Self::is_alive).
///
/// The protocol tag exists only at the type level; nothing about `P` is
/// stored or consulted at runtime.
pub struct TypedHandle<P> {
    link: Option<AgentHandle>,
    _protocol: PhantomData<fn(P) -> P>,
}

impl<P> Clone for TypedHandle<P> {
    fn clone(&self) -> Self {
        TypedHandle {
            link: self.link.clone(),
            _protocol: PhantomData,
        }
    }
}

impl<P> fmt::Debug for TypedHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedHandle")
            .field("link", &self.link)
            .finish()
    }
}

impl<P> Default for TypedHandle<P> {
    fn default() -> Self {
        TypedHandle {
            link: None,
            _protocol: PhantomData,
        }
    }
}

impl<P: Protocol> TypedHandle<P> {
    /// Crate-internal: associates a started agent with its protocol.
    pub(crate) fn new(link: AgentHandle) -> Self {
        TypedHandle {
            link: Some(link),
            _protocol: PhantomData,
        }
    }

    /// A handle referring to no agent; every send through it no-ops.
    pub fn null() -> Self {
        TypedHandle::default()
    }

    /// Whether this handle refers to an agent that can still receive.
    pub fn is_alive(&self) -> bool {
        self.link.as_ref().is_some_and(AgentHandle::is_alive)
    }

    /// The linked agent's identifier, if the handle is non-null.
    pub fn id(&self) -> Option<Ern> {
        self.link.as_ref().map(AgentHandleInterface::id)
    }

    /// The dynamically typed handle behind this one, the explicit
    /// unchecked escape hatch.
    pub fn handle(&self) -> Option<&AgentHandle> {
        self.link.as_ref()
    }

    pub(crate) fn address(&self) -> Option<MessageAddress> {
        self.link.as_ref().map(AgentHandleInterface::reply_address)
    }

    /// Sends `message` without attaching a sender identity, bypassing
    /// the type gate. Always legal, like every anonymous send.
    pub async fn anon_send(&self, message: impl HeraldMessage + 'static) {
        if let Some(link) = &self.link {
            link.anon_send(message).await;
        } else {
            trace!("anon_send through a null typed handle; message discarded");
        }
    }

    /// Anonymous send with the given priority.
    pub async fn anon_send_prioritized(
        &self,
        priority: Priority,
        message: impl HeraldMessage + 'static,
    ) {
        if let Some(link) = &self.link {
            link.anon_send_prioritized(priority, message).await;
        } else {
            trace!("anon_send through a null typed handle; message discarded");
        }
    }

    /// Anonymous delayed send; registers one clock entry unless null.
    pub fn delayed_anon_send(&self, delay: Duration, message: impl HeraldMessage + 'static) {
        if let Some(link) = &self.link {
            link.delayed_anon_send(delay, message);
        } else {
            trace!("delayed_anon_send through a null typed handle; message discarded");
        }
    }

    /// Anonymous scheduled send; registers one clock entry unless null.
    pub fn scheduled_anon_send(&self, deadline: Instant, message: impl HeraldMessage + 'static) {
        if let Some(link) = &self.link {
            link.scheduled_anon_send(deadline, message);
        } else {
            trace!("scheduled_anon_send through a null typed handle; message discarded");
        }
    }
}

/// The typed send capability of an agent speaking protocol `P`.
///
/// A `TypedContext` is obtained inside a handler via
/// [`ManagedAgent::typed`](crate::actor::ManagedAgent::typed) when the
/// agent's model implements [`Protocol`]. It composes the agent's
/// identity (can-send) with the runtime clock (can-schedule), and every
/// operation on it is verified by the type gate:
///
/// * the destination must be a [`TypedHandle`]; there is deliberately no
///   overload for dynamically typed handles, which are reached through
///   `anon_send` instead;
/// * the destination protocol must accept the message shape;
/// * a declared response must itself be acceptable to `P`.
///
/// There is no group operation here: a group's membership is unknown at
/// compile time, so group sends exist only on the unchecked
/// [`GroupHandle`](crate::common::GroupHandle) API.
///
/// A statically typed agent cannot address a dynamic handle through the
/// typed facade:
///
/// ```compile_fail
/// use herald_core::prelude::*;
///
/// #[derive(Clone, Debug)]
/// struct Ping;
///
/// struct Watcher;
/// impl Protocol for Watcher {}
///
/// async fn forbidden(ctx: TypedContext<Watcher>, dest: AgentHandle) {
///     // `send` only accepts `&TypedHandle<_>` destinations.
///     ctx.send(&dest, Ping).await;
/// }
/// ```
///
/// Nor can it publish to a group through it:
///
/// ```compile_fail
/// use herald_core::prelude::*;
///
/// #[derive(Clone, Debug)]
/// struct Tick;
///
/// struct Watcher;
/// impl Protocol for Watcher {}
///
/// async fn forbidden(ctx: TypedContext<Watcher>, group: GroupHandle) {
///     ctx.publish(&group, Tick).await;
/// }
/// ```
pub struct TypedContext<P> {
    address: MessageAddress,
    clock: AgentClock,
    cancellation_token: CancellationToken,
    _protocol: PhantomData<fn(P) -> P>,
}

impl<P> Clone for TypedContext<P> {
    fn clone(&self) -> Self {
        TypedContext {
            address: self.address.clone(),
            clock: self.clock.clone(),
            cancellation_token: self.cancellation_token.clone(),
            _protocol: PhantomData,
        }
    }
}

impl<P> fmt::Debug for TypedContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedContext")
            .field("address", &self.address)
            .finish()
    }
}

impl<P: Protocol> TypedContext<P> {
    pub(crate) fn new(
        address: MessageAddress,
        clock: AgentClock,
        cancellation_token: CancellationToken,
    ) -> Self {
        TypedContext {
            address,
            clock,
            cancellation_token,
            _protocol: PhantomData,
        }
    }

    /// The sending agent's own address.
    pub fn reply_address(&self) -> MessageAddress {
        self.address.clone()
    }

    fn outbound_to(&self, recipient: MessageAddress) -> OutboundEnvelope {
        OutboundEnvelope::new_with_recipient(
            Some(self.address.clone()),
            Some(recipient),
            self.clock.clone(),
            self.cancellation_token.clone(),
        )
    }

    /// Sends `message` to `dest` with normal priority, attaching this
    /// agent as the sender. A null handle makes this a silent no-op.
    pub async fn send<D, M>(&self, dest: &TypedHandle<D>, message: M)
    where
        M: HeraldMessage + 'static,
        D: Accepts<M>,
        D::Response: AcceptableTo<P>,
    {
        self.send_prioritized(dest, Priority::Normal, message).await;
    }

    /// Sends `message` to `dest` with the given priority.
    #[instrument(skip(self, dest, message), fields(sender = %self.address.sender))]
    pub async fn send_prioritized<D, M>(&self, dest: &TypedHandle<D>, priority: Priority, message: M)
    where
        M: HeraldMessage + 'static,
        D: Accepts<M>,
        D::Response: AcceptableTo<P>,
    {
        let Some(recipient) = dest.address() else {
            trace!("Typed send to a null handle; message discarded");
            return;
        };
        self.outbound_to(recipient)
            .send_prioritized(priority, message)
            .await;
    }

    /// Registers `message` for delivery to `dest` after `delay`; exactly
    /// one clock entry, nothing enqueued at call time.
    #[instrument(skip(self, dest, message), fields(sender = %self.address.sender))]
    pub fn delayed_send<D, M>(&self, dest: &TypedHandle<D>, delay: Duration, message: M)
    where
        M: HeraldMessage + 'static,
        D: Accepts<M>,
        D::Response: AcceptableTo<P>,
    {
        let Some(recipient) = dest.address() else {
            trace!("Typed delayed send to a null handle; message discarded");
            return;
        };
        self.outbound_to(recipient).delayed_send(delay, message);
    }

    /// Registers `message` for delivery to `dest` at `deadline`; a
    /// deadline in the past fires at the next scheduling opportunity.
    #[instrument(skip(self, dest, message), fields(sender = %self.address.sender))]
    pub fn scheduled_send<D, M>(&self, dest: &TypedHandle<D>, deadline: Instant, message: M)
    where
        M: HeraldMessage + 'static,
        D: Accepts<M>,
        D::Response: AcceptableTo<P>,
    {
        let Some(recipient) = dest.address() else {
            trace!("Typed scheduled send to a null handle; message discarded");
            return;
        };
        self.outbound_to(recipient).scheduled_send(deadline, message);
    }

    /// Sends `message` as a request and awaits its typed response, with
    /// the configured default timeout.
    ///
    /// The gate requires the destination to declare
    /// `Responds<R>` for `M` and this agent's protocol to accept `R`.
    pub async fn request<D, M, R>(&self, dest: &TypedHandle<D>, message: M) -> Result<R, RequestError>
    where
        M: HeraldMessage + 'static,
        R: HeraldMessage + Clone + 'static,
        D: Accepts<M, Response = Responds<R>>,
        Responds<R>: AcceptableTo<P>,
    {
        self.request_within(HERALD_CONFIG.request_timeout(), dest, message)
            .await
    }

    /// Sends `message` as a request and awaits its typed response for at
    /// most `timeout`.
    ///
    /// The pending entry is registered before dispatch and resolves
    /// exactly once. On timeout the entry is discarded and a later
    /// response is logged as spurious, never redelivered.
    #[instrument(skip(self, dest, message), fields(sender = %self.address.sender))]
    pub async fn request_within<D, M, R>(
        &self,
        timeout: Duration,
        dest: &TypedHandle<D>,
        message: M,
    ) -> Result<R, RequestError>
    where
        M: HeraldMessage + 'static,
        R: HeraldMessage + Clone + 'static,
        D: Accepts<M, Response = Responds<R>>,
        Responds<R>: AcceptableTo<P>,
    {
        let Some(recipient) = dest.address() else {
            return Err(RequestError::Unreachable);
        };
        if self.cancellation_token.is_cancelled() {
            return Err(RequestError::Cancelled);
        }

        let id = MessageId::request(Priority::Normal);
        let receiver = self.address.pending.register(id.correlation());
        let envelope = Envelope::new(
            id,
            Arc::new(message),
            Some(self.address.clone()),
            recipient.clone(),
        );

        if let Err(e) = recipient.enqueue(envelope).await {
            self.address.pending.discard(id.correlation());
            warn!(recipient = %recipient.sender, error = %e, "Request dispatch failed");
            return Err(RequestError::Unreachable);
        }

        match tokio::time::timeout(timeout, receiver).await {
            Err(_elapsed) => {
                self.address.pending.discard(id.correlation());
                Err(RequestError::Timeout(timeout))
            }
            Ok(Err(_closed)) => Err(RequestError::Unreachable),
            Ok(Ok(payload)) => payload
                .as_any()
                .downcast_ref::<R>()
                .cloned()
                .ok_or(RequestError::UnexpectedResponse(std::any::type_name::<R>())),
        }
    }
}
