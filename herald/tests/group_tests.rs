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
use std::time::Duration;

use herald::prelude::*;
use herald_test::prelude::*;

use crate::setup::actors::Recorder;
use crate::setup::messages::AuditTick;
use crate::setup::*;

mod setup;

async fn start_auditor(
    runtime: &mut AgentRuntime,
    name: &str,
) -> anyhow::Result<(AgentHandle, Arc<Mutex<Vec<u32>>>)> {
    let mut builder = runtime
        .new_agent_with_config::<Recorder>(AgentConfig::new_with_name(name)?)
        .await;
    builder.act_on::<AuditTick>(|agent, context| {
        agent.model.record(context.message().0);
        AgentReply::immediate()
    });
    let seen = builder.model.seen.clone();
    Ok((builder.start().await, seen))
}

/// A group publish fans one generic envelope out to every current
/// member; membership changes take effect for subsequent publishes.
#[herald_test]
async fn publish_reaches_current_members_only() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();

    let (first_handle, first_seen) = start_auditor(&mut runtime, "first_auditor").await?;
    let (second_handle, second_seen) = start_auditor(&mut runtime, "second_auditor").await?;

    let auditors = runtime.group("auditors");
    auditors.join_agent(&first_handle);
    auditors.join_agent(&second_handle);
    assert_eq!(auditors.member_count(), 2);

    auditors.publish(AuditTick(1)).await;

    let (first_probe, second_probe) = (first_seen.clone(), second_seen.clone());
    wait_until("both auditors saw the first tick", move || {
        !first_probe.lock().expect("poisoned").is_empty()
            && !second_probe.lock().expect("poisoned").is_empty()
    })
    .await;

    // The same name resolves to the same membership.
    runtime.group("auditors").leave(&second_handle.id());
    assert_eq!(auditors.member_count(), 1);

    auditors.publish(AuditTick(2)).await;

    let first_probe = first_seen.clone();
    wait_until("remaining auditor saw the second tick", move || {
        first_probe.lock().expect("poisoned").len() == 2
    })
    .await;

    runtime.shutdown_all().await?;

    assert_eq!(&*first_seen.lock().expect("poisoned"), &[1, 2]);
    assert_eq!(&*second_seen.lock().expect("poisoned"), &[1]);
    Ok(())
}

/// Group publishes carry no sender identity unless one is attached
/// explicitly with `publish_from`.
#[herald_test]
async fn publish_is_anonymous_by_default() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();

    let observed: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let observed_slot = observed.clone();

    let mut builder = runtime
        .new_agent_with_config::<Recorder>(AgentConfig::new_with_name("auditor")?)
        .await;
    builder.act_on::<AuditTick>(move |_agent, context| {
        let sender = context
            .origin_envelope()
            .reply_to()
            .map(|address| address.name().to_string());
        observed_slot.lock().expect("poisoned").push(sender);
        AgentReply::immediate()
    });
    let auditor_handle = builder.start().await;

    let group = runtime.group("audit_channel");
    group.join_agent(&auditor_handle);

    group.publish(AuditTick(1)).await;
    group
        .publish_from(auditor_handle.reply_address(), AuditTick(2))
        .await;

    let observed_probe = observed.clone();
    wait_until("both ticks observed", move || {
        observed_probe.lock().expect("poisoned").len() == 2
    })
    .await;

    runtime.shutdown_all().await?;

    assert_eq!(
        &*observed.lock().expect("poisoned"),
        &[None, Some("auditor".to_string())]
    );
    Ok(())
}

/// A null group handle ignores joins and publishes without error.
#[herald_test]
async fn null_group_is_a_silent_no_op() -> anyhow::Result<()> {
    initialize_tracing();
    let group = GroupHandle::null();
    assert!(!group.is_alive());

    group.publish(AuditTick(1)).await;
    group.delayed_publish(Duration::from_secs(1), AuditTick(2));
    assert_eq!(group.member_count(), 0);
    Ok(())
}

/// A delayed group publish registers with the clock and fans out at the
/// deadline, reading membership at fire time.
#[tokio::test(start_paused = true)]
async fn delayed_publish_fans_out_at_the_deadline() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();
    let clock = runtime.clock();

    let (auditor_handle, seen) = start_auditor(&mut runtime, "auditor").await?;

    let group = runtime.group("auditors");
    let registered_before = clock.registered_count();
    group.delayed_publish(Duration::from_secs(2), AuditTick(7));
    assert_eq!(clock.registered_count(), registered_before + 1);

    // Joined after registration but before the deadline: membership is
    // read when the timer fires, so the auditor still receives the tick.
    group.join_agent(&auditor_handle);

    let seen_probe = seen.clone();
    wait_until("tick delivered", move || {
        !seen_probe.lock().expect("poisoned").is_empty()
    })
    .await;

    runtime.shutdown_all().await?;

    assert_eq!(&*seen.lock().expect("poisoned"), &[7]);
    Ok(())
}
