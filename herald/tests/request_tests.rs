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

use crate::setup::actors::{PricingDesk, Trader};
use crate::setup::messages::{GetQuote, Ping, Quote};
use crate::setup::*;

mod setup;

/// Outcome slot a requesting handler writes into for the test to assert on.
type Outcome<T> = Arc<Mutex<Option<T>>>;

/// A pending request resolves exactly once: when the responder answers
/// the same request twice, the requester sees the first answer and the
/// duplicate is discarded as spurious.
#[herald_test]
async fn duplicate_responses_resolve_only_once() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();

    let mut desk_builder = runtime
        .new_agent_with_config::<PricingDesk>(AgentConfig::new_with_name("pricing_desk")?)
        .await;
    desk_builder.act_on::<GetQuote>(|_agent, context| {
        let reply_envelope = context.reply_envelope().clone();
        AgentReply::from_async(async move {
            // Answer twice; only the first resolution may land.
            reply_envelope.send(Quote(1)).await;
            reply_envelope.send(Quote(2)).await;
        })
    });
    let desk = desk_builder.start_typed().await;

    let outcome: Outcome<u64> = Arc::new(Mutex::new(None));
    let outcome_slot = outcome.clone();
    let mut trader_builder = runtime
        .new_agent_with_config::<Trader>(AgentConfig::new_with_name("trader")?)
        .await;
    let desk_for_handler = desk.clone();
    trader_builder.act_on::<Ping>(move |agent, _context| {
        let ctx = agent.typed();
        let desk = desk_for_handler.clone();
        let outcome = outcome_slot.clone();
        AgentReply::from_async(async move {
            let Quote(price) = ctx
                .request(&desk, GetQuote(1))
                .await
                .expect("request failed");
            *outcome.lock().expect("outcome poisoned") = Some(price);
        })
    });
    let trader_handle = trader_builder.start().await;

    trader_handle.anon_send(Ping).await;

    let outcome_probe = outcome.clone();
    wait_until("request resolved", move || {
        outcome_probe.lock().expect("outcome poisoned").is_some()
    })
    .await;

    // Give the duplicate time to arrive and be discarded.
    tokio::time::sleep(Duration::from_millis(100)).await;

    runtime.shutdown_all().await?;

    assert_eq!(*outcome.lock().expect("outcome poisoned"), Some(1));
    Ok(())
}

/// A request whose responder is slower than the timeout resolves with a
/// timeout failure; the late response is discarded as stale and does not
/// alter the already-delivered result.
#[herald_test]
async fn late_responses_after_timeout_are_stale() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();

    let mut desk_builder = runtime
        .new_agent_with_config::<PricingDesk>(AgentConfig::new_with_name("slow_desk")?)
        .await;
    desk_builder.act_on::<GetQuote>(|_agent, context| {
        let reply_envelope = context.reply_envelope().clone();
        AgentReply::from_async(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            reply_envelope.send(Quote(99)).await;
        })
    });
    let desk = desk_builder.start_typed().await;

    let outcome: Outcome<Result<u64, String>> = Arc::new(Mutex::new(None));
    let outcome_slot = outcome.clone();
    let mut trader_builder = runtime
        .new_agent_with_config::<Trader>(AgentConfig::new_with_name("trader")?)
        .await;
    let desk_for_handler = desk.clone();
    trader_builder.act_on::<Ping>(move |agent, _context| {
        let ctx = agent.typed();
        let desk = desk_for_handler.clone();
        let outcome = outcome_slot.clone();
        AgentReply::from_async(async move {
            let result = ctx
                .request_within(Duration::from_millis(50), &desk, GetQuote(1))
                .await
                .map(|quote| quote.0)
                .map_err(|e| e.to_string());
            *outcome.lock().expect("outcome poisoned") = Some(result);
        })
    });
    let trader_handle = trader_builder.start().await;

    trader_handle.anon_send(Ping).await;

    let outcome_probe = outcome.clone();
    wait_until("request timed out", move || {
        outcome_probe.lock().expect("outcome poisoned").is_some()
    })
    .await;

    let first_outcome = outcome
        .lock()
        .expect("outcome poisoned")
        .clone()
        .expect("outcome recorded");
    assert!(first_outcome.is_err(), "expected a timeout, got {first_outcome:?}");

    // Let the stale response arrive; it must not change the outcome.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(
        outcome.lock().expect("outcome poisoned").clone(),
        Some(first_outcome)
    );

    runtime.shutdown_all().await?;
    Ok(())
}

/// Dynamically typed agents fall back to the untyped request primitive
/// and downcast the payload themselves.
#[herald_test]
async fn untyped_request_any_round_trip() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();

    let mut desk_builder = runtime
        .new_agent_with_config::<PricingDesk>(AgentConfig::new_with_name("desk")?)
        .await;
    desk_builder.act_on::<GetQuote>(|_agent, context| {
        let reply_envelope = context.reply_envelope().clone();
        AgentReply::from_async(async move {
            reply_envelope.send(Quote(77)).await;
        })
    });
    // Started dynamically: no protocol involved on either side.
    let desk_handle = desk_builder.start().await;

    let outcome: Outcome<u64> = Arc::new(Mutex::new(None));
    let outcome_slot = outcome.clone();
    let mut asker_builder = runtime
        .new_agent_with_config::<Trader>(AgentConfig::new_with_name("asker")?)
        .await;
    asker_builder.act_on::<Ping>(move |agent, _context| {
        let outcome = outcome_slot.clone();
        let desk_handle = agent.model.desk.clone();
        let response = agent.request_any(&desk_handle, GetQuote(11));
        AgentReply::from_async(async move {
            let payload = response.await.expect("request failed");
            let quote = payload
                .as_any()
                .downcast_ref::<Quote>()
                .expect("unexpected payload type");
            *outcome.lock().expect("outcome poisoned") = Some(quote.0);
        })
    });
    asker_builder.model.desk = desk_handle.clone();
    let asker_handle = asker_builder.start().await;

    asker_handle.anon_send(Ping).await;

    let outcome_probe = outcome.clone();
    wait_until("untyped request resolved", move || {
        outcome_probe.lock().expect("outcome poisoned").is_some()
    })
    .await;

    runtime.shutdown_all().await?;

    assert_eq!(*outcome.lock().expect("outcome poisoned"), Some(77));
    Ok(())
}
