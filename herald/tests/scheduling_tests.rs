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

//! Clock-scheduled delivery tests.
//!
//! These run on a paused-time runtime so deadlines are exact: the runtime
//! advances the clock to the earliest pending timer whenever every task
//! is otherwise idle.

use std::time::Duration;

use herald::prelude::*;

use crate::setup::actors::Recorder;
use crate::setup::messages::Tag;
use crate::setup::*;

mod setup;

async fn start_recorder(
    runtime: &mut AgentRuntime,
) -> anyhow::Result<(AgentHandle, std::sync::Arc<std::sync::Mutex<Vec<u32>>>)> {
    let mut recorder_builder = runtime
        .new_agent_with_config::<Recorder>(AgentConfig::new_with_name("recorder")?)
        .await;
    recorder_builder.act_on::<Tag>(|agent, context| {
        agent.model.record(context.message().0);
        AgentReply::immediate()
    });
    let seen = recorder_builder.model.seen.clone();
    Ok((recorder_builder.start().await, seen))
}

/// A delayed send registers exactly one clock entry at `now + delay` and
/// enqueues nothing at call time; delivery happens once the deadline is
/// reached.
#[tokio::test(start_paused = true)]
async fn delayed_send_registers_one_clock_entry() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();
    let clock = runtime.clock();
    let (recorder_handle, seen) = start_recorder(&mut runtime).await?;

    let registered_before = clock.registered_count();
    let call_time = clock.now();

    recorder_handle.delayed_anon_send(Duration::from_secs(5), Tag(5));

    // Exactly one registration, no direct enqueue at call time.
    assert_eq!(clock.registered_count(), registered_before + 1);
    assert_eq!(clock.pending_count(), 1);
    assert!(seen.lock().expect("recorder poisoned").is_empty());

    let seen_probe = seen.clone();
    wait_until("delayed tag delivered", move || {
        !seen_probe.lock().expect("recorder poisoned").is_empty()
    })
    .await;

    // Paused time jumped to the deadline: five seconds elapsed.
    assert!(clock.now() - call_time >= Duration::from_secs(5));
    assert_eq!(&*seen.lock().expect("recorder poisoned"), &[5]);

    runtime.shutdown_all().await?;
    Ok(())
}

/// A zero-duration delay still goes through the clock: delivery happens
/// at the next scheduling opportunity, not synchronously in the caller.
#[tokio::test(start_paused = true)]
async fn zero_delay_is_not_synchronous() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();
    let clock = runtime.clock();
    let (recorder_handle, seen) = start_recorder(&mut runtime).await?;

    let registered_before = clock.registered_count();
    recorder_handle.delayed_anon_send(Duration::ZERO, Tag(1));

    // Registered with the clock rather than enqueued synchronously.
    assert_eq!(clock.registered_count(), registered_before + 1);
    assert!(seen.lock().expect("recorder poisoned").is_empty());

    let seen_probe = seen.clone();
    wait_until("tag delivered", move || {
        !seen_probe.lock().expect("recorder poisoned").is_empty()
    })
    .await;

    runtime.shutdown_all().await?;
    Ok(())
}

/// A deadline already in the past delivers at the next scheduling
/// opportunity.
#[tokio::test(start_paused = true)]
async fn past_deadline_delivers_at_next_opportunity() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();
    let clock = runtime.clock();
    let (recorder_handle, seen) = start_recorder(&mut runtime).await?;

    recorder_handle.scheduled_anon_send(clock.now(), Tag(2));
    assert!(seen.lock().expect("recorder poisoned").is_empty());

    let seen_probe = seen.clone();
    wait_until("tag delivered", move || {
        !seen_probe.lock().expect("recorder poisoned").is_empty()
    })
    .await;

    runtime.shutdown_all().await?;
    Ok(())
}

/// Tearing the clock down drops registrations that have not fired;
/// the envelopes are discarded undelivered.
#[tokio::test(start_paused = true)]
async fn clock_teardown_drops_unfired_registrations() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();
    let clock = runtime.clock();
    let (recorder_handle, seen) = start_recorder(&mut runtime).await?;

    recorder_handle.delayed_anon_send(Duration::from_secs(3600), Tag(9));
    assert_eq!(clock.pending_count(), 1);

    runtime.shutdown_all().await?;

    assert_eq!(clock.pending_count(), 0);
    assert!(seen.lock().expect("recorder poisoned").is_empty());
    Ok(())
}

/// Delayed sends promise deadline order, not registration order.
#[tokio::test(start_paused = true)]
async fn delayed_sends_deliver_in_deadline_order() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();
    let (recorder_handle, seen) = start_recorder(&mut runtime).await?;

    recorder_handle.delayed_anon_send(Duration::from_secs(10), Tag(10));
    recorder_handle.delayed_anon_send(Duration::from_secs(1), Tag(1));

    let seen_probe = seen.clone();
    wait_until("both tags delivered", move || {
        seen_probe.lock().expect("recorder poisoned").len() == 2
    })
    .await;

    assert_eq!(&*seen.lock().expect("recorder poisoned"), &[1, 10]);

    runtime.shutdown_all().await?;
    Ok(())
}
