use std::sync::Arc;
use tokio::time::{Duration, sleep};

use serde_json::json;
use tether_core::impls::InMemoryRemoteStore;
use tether_core::{ActorId, EntityId, Payload, SyncBuilder};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // (A) in-memory backend + wired core
    let store = Arc::new(InMemoryRemoteStore::new());
    let core = SyncBuilder::new(store.clone())
        .queue_capacity(16)
        .build()
        .expect("valid configuration");

    // (B) print every user-facing notification as it arrives
    let mut events = core.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("notification: {event:?}");
        }
    });

    let actor = ActorId::new("demo-user");
    let task = EntityId::generate();

    // (C) online edit: write goes out immediately
    core.orchestrator()
        .submit_edit(
            task.clone(),
            Payload::new().with("title", json!("write the weekly review")),
            actor.clone(),
        )
        .expect("submit accepted");
    sleep(Duration::from_millis(50)).await;
    println!("row after online edit: {:?}", store.row(&task));

    // (D) connectivity drops; edits queue instead of failing
    core.monitor().set_online(false);
    core.orchestrator()
        .submit_edit(
            task.clone(),
            Payload::new().with("status", json!("in-progress")),
            actor.clone(),
        )
        .expect("submit accepted");

    let second = EntityId::generate();
    core.orchestrator()
        .submit_edit(
            second.clone(),
            Payload::new().with("title", json!("book the dentist")),
            actor.clone(),
        )
        .expect("submit accepted");

    let status = core.orchestrator().status();
    println!(
        "offline: queued={} saving={} row_unchanged={:?}",
        status.queued_offline,
        status.saving,
        store.row(&task)
    );

    // (E) reconnection flushes the queue in order
    core.monitor().set_online(true);
    sleep(Duration::from_millis(50)).await;

    println!("row after flush: {:?}", store.row(&task));
    println!("second row:     {:?}", store.row(&second));
    for entry in store.history_entries() {
        println!(
            "history: {} {:?} by {} ({} fields)",
            entry.entity_id,
            entry.action,
            entry.actor_id,
            entry.changes.len()
        );
    }

    core.shutdown().await;
    printer.abort();
}
