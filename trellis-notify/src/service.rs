//! 通知服务（NotificationService）
//!
//! 广播式发布/匹配管线：通知统一注册在同一伞形种类下，按过滤器
//! 而非事件种类区分；命中的订阅者各自作为独立任务投给小型定长池。
//! 无链、无 singleton、无回调路由，纯 fire-and-forget。
//!
use crate::filter::SubscriptionFilter;
use crate::notification::Notification;
use crate::subscriber::{NotificationSubscriber, NotificationSubscriberKind};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, error, info};
use trellis_events::error::EventResult;
use trellis_events::hooks::{AuditHook, MetricsSink, NoopAudit, NoopMetrics};
use trellis_events::pool::{WorkerPool, await_drained};

// 通知负载轻，定长小池足够
const NOTIFY_WORKER_COUNT: usize = 4;

struct Registration {
    filter: SubscriptionFilter,
    subscriber: NotificationSubscriberKind,
}

pub struct NotificationService {
    name: String,
    registrations: RwLock<Vec<Registration>>,
    pool: WorkerPool,
    audit: Arc<dyn AuditHook>,
    metrics: Arc<dyn MetricsSink>,
}

impl NotificationService {
    /// 以默认 no-op 钩子构造；需在 Tokio 运行时内调用
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_hooks(name, Arc::new(NoopAudit), Arc::new(NoopMetrics))
    }

    pub fn with_hooks(
        name: impl Into<String>,
        audit: Arc<dyn AuditHook>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Arc<Self> {
        let name = name.into();
        let pool = WorkerPool::new(format!("{name}-notify"), NOTIFY_WORKER_COUNT);
        Arc::new(Self {
            name,
            registrations: RwLock::new(Vec::new()),
            pool,
            audit,
            metrics,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 以过滤器注册订阅者种类（`Default` 构造为工厂）
    ///
    /// 同一 (过滤器, 订阅者种类) 重复注册为 no-op。
    pub fn subscribe<S>(&self, filter: SubscriptionFilter)
    where
        S: NotificationSubscriber + Default + 'static,
    {
        self.subscribe_kind(filter, NotificationSubscriberKind::of::<S>());
    }

    /// 以显式工厂注册
    pub fn subscribe_with<S, F>(&self, filter: SubscriptionFilter, factory: F)
    where
        S: NotificationSubscriber + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.subscribe_kind(filter, NotificationSubscriberKind::from_factory(factory));
    }

    fn subscribe_kind(&self, filter: SubscriptionFilter, subscriber: NotificationSubscriberKind) {
        let mut registrations = self.registrations.write().expect("registrations lock");
        let duplicate = registrations
            .iter()
            .any(|r| r.filter == filter && r.subscriber.id() == subscriber.id());
        if !duplicate {
            registrations.push(Registration { filter, subscriber });
        }
    }

    /// 移除所有携带相同过滤器的注册；不存在时无副作用
    pub fn unsubscribe(&self, filter: &SubscriptionFilter) {
        self.registrations
            .write()
            .expect("registrations lock")
            .retain(|r| r.filter != *filter);
    }

    /// 是否存在匹配该通知的注册
    pub fn has_subscriptions(&self, notification: &Notification) -> bool {
        self.registrations
            .read()
            .expect("registrations lock")
            .iter()
            .any(|r| r.filter.matches(notification))
    }

    /// 发布通知：对每个命中的订阅者投递一个独立任务
    ///
    /// 指标计数与命中数无关，每次发布恰好一次。
    pub fn publish(&self, notification: Notification) -> EventResult<()> {
        self.metrics.count(
            "notifications_published",
            &[
                ("scope", notification.scope()),
                ("group", notification.group()),
                ("level", notification.level().as_str()),
            ],
        );

        let matched: Vec<NotificationSubscriberKind> = self
            .registrations
            .read()
            .expect("registrations lock")
            .iter()
            .filter(|r| r.filter.matches(&notification))
            .map(|r| r.subscriber.clone())
            .collect();

        if matched.is_empty() {
            debug!(
                service = %self.name,
                group = notification.group(),
                level = %notification.level(),
                "no matching notification subscribers"
            );
            return Ok(());
        }

        let notification = Arc::new(notification);
        for subscriber in matched {
            let service = self.name.clone();
            let audit = self.audit.clone();
            let notification = notification.clone();
            self.pool.submit(Box::pin(async move {
                audit.subscriber_started(subscriber.name());
                let outcome = AssertUnwindSafe(async {
                    let mut instance = subscriber.instantiate();
                    instance.notify(notification.as_ref()).await
                })
                .catch_unwind()
                .await;
                audit.subscriber_completed(subscriber.name());

                match outcome {
                    Ok(Ok(())) => {
                        debug!(
                            service = %service,
                            subscriber = subscriber.name(),
                            "notification subscriber informed"
                        );
                    }
                    Ok(Err(err)) => {
                        error!(
                            service = %service,
                            subscriber = subscriber.name(),
                            error = %err,
                            "notification subscriber failed"
                        );
                    }
                    Err(_) => {
                        error!(
                            service = %service,
                            subscriber = subscriber.name(),
                            "notification subscriber panicked"
                        );
                    }
                }
            }))?;
        }
        Ok(())
    }

    /// 停止接收新提交；已排队与在途任务继续执行
    pub fn shutdown(&self) {
        info!(service = %self.name, "notification service shutting down");
        self.pool.shutdown();
    }

    /// shutdown 并在限时内等待排空
    pub async fn shutdown_timeout(&self, timeout: Duration) -> bool {
        self.shutdown();
        await_drained(|| vec![self.pool.stats()], timeout).await
    }
}
