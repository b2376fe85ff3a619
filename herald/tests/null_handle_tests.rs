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

/// Every send shape through a null handle is a silent no-op: no enqueue,
/// no clock registration, no error. A request, by contrast, must resolve
/// and does so with `Unreachable`.
#[herald_test]
async fn null_handle_sends_are_silent_no_ops() -> anyhow::Result<()> {
    initialize_tracing();
    let mut runtime = HeraldApp::launch();
    let clock = runtime.clock();

    let outcome: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let outcome_slot = outcome.clone();

    let mut trader_builder = runtime
        .new_agent_with_config::<Trader>(AgentConfig::new_with_name("trader")?)
        .await;
    trader_builder.act_on::<Ping>(move |agent, _context| {
        let ctx = agent.typed();
        let outcome = outcome_slot.clone();
        AgentReply::from_async(async move {
            let nobody = TypedHandle::<PricingDesk>::null();
            assert!(!nobody.is_alive());

            // One-way shapes: all silent no-ops.
            ctx.send(&nobody, GetQuote(1)).await;
            ctx.delayed_send(&nobody, Duration::from_secs(1), GetQuote(2));
            ctx.scheduled_send(&nobody, tokio::time::Instant::now(), GetQuote(3));
            nobody.anon_send(GetQuote(4)).await;
            nobody.delayed_anon_send(Duration::from_secs(1), GetQuote(5));

            // A request must resolve; a null destination is unreachable.
            let result = ctx.request(&nobody, GetQuote(6)).await;
            let rendered = match result {
                Ok(Quote(price)) => format!("resolved: {price}"),
                Err(e) => e.to_string(),
            };
            *outcome.lock().expect("outcome poisoned") = Some(rendered);
        })
    });
    let trader_handle = trader_builder.start().await;

    let registered_before = clock.registered_count();
    trader_handle.anon_send(Ping).await;

    let outcome_probe = outcome.clone();
    wait_until("null-handle exercise finished", move || {
        outcome_probe.lock().expect("outcome poisoned").is_some()
    })
    .await;

    // No clock registration happened for any of the delayed/scheduled
    // shapes above.
    assert_eq!(clock.registered_count(), registered_before);

    runtime.shutdown_all().await?;

    let rendered = outcome
        .lock()
        .expect("outcome poisoned")
        .clone()
        .expect("outcome recorded");
    assert!(
        rendered.contains("unreachable"),
        "expected an unreachable request, got: {rendered}"
    );
    Ok(())
}
