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

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use acton_ern::Ern;
use futures::future::join_all;
use tracing::trace;

use crate::actor::{AgentConfig, Idle, ManagedAgent};
use crate::common::clock::AgentClock;
use crate::common::herald_inner::HeraldInner;
use crate::common::{AgentHandle, GroupHandle, HeraldApp};
use crate::traits::AgentHandleInterface;

/// A launched Herald runtime: spawns agents, resolves named groups, and
/// owns the scheduling clock they share.
#[derive(Debug, Clone, Default)]
pub struct AgentRuntime(pub(crate) HeraldInner);

impl AgentRuntime {
    /// Creates a new agent whose ERN root is the provided name.
    ///
    /// # Type Parameters
    ///
    /// * `State` - The model type of the agent, which must implement
    ///   `Default`, `Send`, `Debug`, and have a static lifetime.
    ///
    /// # Returns
    ///
    /// A `ManagedAgent` in the `Idle` state with the specified `State`.
    pub async fn new_agent_with_name<State>(&mut self, name: String) -> ManagedAgent<Idle, State>
    where
        State: Default + Send + Debug + 'static,
    {
        let config = AgentConfig::new(Ern::with_root(name).unwrap(), None)
            .expect("Failed to create agent config");
        self.new_agent_with_config(config).await
    }

    /// Creates a new agent with default configuration.
    pub async fn new_agent<State>(&mut self) -> ManagedAgent<Idle, State>
    where
        State: Default + Send + Debug + 'static,
    {
        let config = AgentConfig::new(Ern::with_root("agent").unwrap(), None)
            .expect("Failed to create agent config");
        self.new_agent_with_config(config).await
    }

    /// Creates a new agent with a specified configuration.
    pub async fn new_agent_with_config<State>(
        &mut self,
        config: AgentConfig,
    ) -> ManagedAgent<Idle, State>
    where
        State: Default + Send + Debug + 'static,
    {
        let runtime = self.clone();
        let new_agent = ManagedAgent::new(&Some(runtime), Some(config)).await;
        trace!("Created new agent with id {}", new_agent.id);
        self.0
            .roots
            .insert(new_agent.id.clone(), new_agent.handle.clone());
        new_agent
    }

    /// Spawns an agent with a custom setup function and configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The `AgentConfig` to use for creating the agent.
    /// * `setup_fn` - A function that takes the idle `ManagedAgent` and
    ///   returns a `Future` resolving to its started `AgentHandle`.
    pub async fn spawn_agent_with_setup_fn<State>(
        &mut self,
        config: AgentConfig,
        setup_fn: impl FnOnce(
            ManagedAgent<Idle, State>,
        ) -> Pin<Box<dyn Future<Output = AgentHandle> + Send + 'static>>,
    ) -> anyhow::Result<AgentHandle>
    where
        State: Default + Send + Debug + 'static,
    {
        let runtime = self.clone();
        let new_agent = ManagedAgent::new(&Some(runtime), Some(config)).await;
        let handle = setup_fn(new_agent).await;
        self.0.roots.insert(handle.id(), handle.clone());
        Ok(handle)
    }

    /// Retrieves the number of root agents currently tracked by the runtime.
    pub fn agent_count(&self) -> usize {
        self.0.roots.len()
    }

    /// Resolves the named group, creating it on first use.
    ///
    /// Group handles obtained here share one membership registry;
    /// membership changes are visible to every holder.
    pub fn group(&self, name: impl Into<String>) -> GroupHandle {
        let name = name.into();
        self.0
            .groups
            .entry(name.clone())
            .or_insert_with(|| {
                let id = Ern::with_root(name).unwrap_or_default();
                GroupHandle::new(id, self.0.clock.clone())
            })
            .clone()
    }

    /// The scheduling clock shared by this runtime.
    pub fn clock(&self) -> AgentClock {
        self.0.clock.clone()
    }

    /// Shuts down the runtime: stops all root agents and tears down the
    /// clock, dropping timer entries that have not fired.
    pub async fn shutdown_all(&mut self) -> anyhow::Result<()> {
        let stop_futures = self.0.roots.iter().map(|item| {
            let root_agent = item.value().clone();
            async move { root_agent.stop().await }
        });

        let results: Vec<anyhow::Result<()>> = join_all(stop_futures).await;
        for result in results {
            result?;
        }

        self.0.clock.shutdown().await;
        Ok(())
    }
}

impl From<HeraldApp> for AgentRuntime {
    fn from(_herald: HeraldApp) -> Self {
        AgentRuntime(HeraldInner::default())
    }
}
