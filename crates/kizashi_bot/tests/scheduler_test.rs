//! Scheduler tick tests, run on paused time.

mod test_utils;

use kizashi_bot::{PipelineSettingsBuilder, Scheduler};
use kizashi_error::FailureClass;
use kizashi_storage::InMemoryDedupStore;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{FixedSource, RecordingPublisher, ScriptedBackend, candidate, pipeline};
use tokio::sync::watch;

const MINUTE: Duration = Duration::from_secs(60);

#[tokio::test(start_paused = true)]
async fn test_tick_during_running_cycle_is_skipped() {
    let backend = Arc::new(ScriptedBackend::failing(FailureClass::Other));
    let source = Arc::new(FixedSource::slow(vec![candidate(1)], 90 * MINUTE));
    let publisher = Arc::new(RecordingPublisher::new());
    let store = Arc::new(InMemoryDedupStore::new());
    let pipeline = Arc::new(pipeline(
        backend,
        source.clone(),
        publisher,
        store,
        PipelineSettingsBuilder::default().build().unwrap(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Scheduler::new(60 * MINUTE, true);
    let handle = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { scheduler.run(pipeline, shutdown_rx).await })
    };

    // Ticks at 0, 60 and 120 minutes; the first cycle runs until 90.
    tokio::time::sleep(150 * MINUTE).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    let metrics = pipeline.metrics();
    assert_eq!(metrics.cycles_run(), 2);
    assert_eq!(metrics.ticks_skipped(), 1);
    assert_eq!(source.fetch_count(), 2);
    // The cycle in flight at shutdown was allowed to finish.
    assert!(metrics.time_since_success().is_some());
    assert_eq!(metrics.posts_published(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_without_run_on_start_first_cycle_waits_an_interval() {
    let backend = Arc::new(ScriptedBackend::failing(FailureClass::Other));
    let source = Arc::new(FixedSource::new(vec![candidate(1)]));
    let publisher = Arc::new(RecordingPublisher::new());
    let store = Arc::new(InMemoryDedupStore::new());
    let pipeline = Arc::new(pipeline(
        backend,
        source.clone(),
        publisher,
        store,
        PipelineSettingsBuilder::default().build().unwrap(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Scheduler::new(60 * MINUTE, false);
    let handle = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { scheduler.run(pipeline, shutdown_rx).await })
    };

    tokio::time::sleep(30 * MINUTE).await;
    assert_eq!(source.fetch_count(), 0);

    tokio::time::sleep(45 * MINUTE).await;
    assert_eq!(source.fetch_count(), 1);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
    assert_eq!(pipeline.metrics().ticks_skipped(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_sender_stops_scheduler() {
    let backend = Arc::new(ScriptedBackend::failing(FailureClass::Other));
    let source = Arc::new(FixedSource::new(Vec::new()));
    let pipeline = Arc::new(pipeline(
        backend,
        source,
        Arc::new(RecordingPublisher::new()),
        Arc::new(InMemoryDedupStore::new()),
        PipelineSettingsBuilder::default().build().unwrap(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Scheduler::new(60 * MINUTE, true);
    let handle = tokio::spawn(async move { scheduler.run(pipeline, shutdown_rx).await });

    tokio::time::sleep(MINUTE).await;
    drop(shutdown_tx);
    handle.await.unwrap();
}
