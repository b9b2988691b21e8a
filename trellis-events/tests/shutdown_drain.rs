use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use trellis_events::{
    Event, EventError, EventKind, EventService, EventServiceConfig, Subscriber,
};

struct Ping;
impl Event for Ping {
    fn kind(&self) -> EventKind {
        EventKind::of::<Self>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Probe {
    hits: Arc<AtomicUsize>,
    delay: Duration,
}
#[async_trait]
impl Subscriber for Probe {
    async fn inform(&mut self, _event: &dyn Event) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

fn small_pool() -> EventServiceConfig {
    EventServiceConfig {
        worker_count: Some(2),
        ..EventServiceConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_drains_queued_work_within_timeout() {
    let service = EventService::new("events", small_pool());
    let hits = Arc::new(AtomicUsize::new(0));
    let probe_hits = hits.clone();
    service.subscribe_with::<Ping, Probe, _>(move || Probe {
        hits: probe_hits.clone(),
        delay: Duration::from_millis(10),
    });

    for _ in 0..20 {
        service.publish(Arc::new(Ping)).expect("publish");
    }

    assert!(service.shutdown_timeout(Duration::from_secs(5)).await);
    // 已排队任务全部跑完后才终止
    assert_eq!(hits.load(Ordering::Relaxed), 20);
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_times_out_on_slow_subscriber_then_recovers() {
    let service = EventService::new("events", small_pool());
    let hits = Arc::new(AtomicUsize::new(0));
    let probe_hits = hits.clone();
    service.subscribe_with::<Ping, Probe, _>(move || Probe {
        hits: probe_hits.clone(),
        delay: Duration::from_millis(1500),
    });

    service.publish(Arc::new(Ping)).expect("publish");
    // 让慢任务先被工作者取走
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!service.shutdown_timeout(Duration::from_millis(300)).await);
    // 慢任务结束后仍可完全排空
    assert!(service.shutdown_timeout(Duration::from_secs(5)).await);
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn publish_after_shutdown_fails_fast() {
    let service = EventService::new("events", small_pool());
    let hits = Arc::new(AtomicUsize::new(0));
    let probe_hits = hits.clone();
    service.subscribe_with::<Ping, Probe, _>(move || Probe {
        hits: probe_hits.clone(),
        delay: Duration::ZERO,
    });

    assert!(service.shutdown_timeout(Duration::from_secs(5)).await);
    assert!(matches!(
        service.publish(Arc::new(Ping)),
        Err(EventError::PoolClosed { .. })
    ));
}
