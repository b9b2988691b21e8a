//! 事件服务（EventService）
//!
//! 统一编排“查表 → 准入 → 路由 → 提交 → 计数”的发布管线：
//! - 订阅者按注册顺序各自作为独立任务提交，提交顺序确定、完成顺序不保证；
//! - 可链事件经链跟踪器准入，singleton 冲突时整体丢弃并记日志；
//! - "unblocked" 事件路由到弹性池，其余进入有界工作池；
//! - 订阅者构造/执行失败（含 panic）在任务内消化：记错误日志、
//!   派发失败回调，绝不抛回发布方；
//! - 链登记的释放由共享守卫在最后一个任务结束时兜底完成。
//!
//! 服务实例显式构造、按引用传递；测试各自构造隔离实例，没有全局单例。
//!
use crate::chain::{ChainGuard, ChainTracker};
use crate::config::EventServiceConfig;
use crate::dispatcher::EventDispatcher;
use crate::error::EventResult;
use crate::event::{ChainCallback, ChainGroupId, Event, EventKind};
use crate::hooks::{AuditHook, MetricsSink, NoopAudit, NoopMetrics};
use crate::pool::{ElasticPool, WorkerPool, await_drained};
use crate::registry::SubscriptionRegistry;
use crate::subscriber::{Subscriber, SubscriberKind};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::any::{Any, TypeId};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct EventService {
    name: String,
    registry: SubscriptionRegistry,
    chains: ChainTracker,
    workers: WorkerPool,
    elastic: ElasticPool,
    audit: Arc<dyn AuditHook>,
    metrics: Arc<dyn MetricsSink>,
    dispatcher: OnceLock<Weak<EventDispatcher>>,
}

impl EventService {
    /// 以默认 no-op 钩子构造；需在 Tokio 运行时内调用
    pub fn new(name: impl Into<String>, config: EventServiceConfig) -> Arc<Self> {
        Self::with_hooks(name, config, Arc::new(NoopAudit), Arc::new(NoopMetrics))
    }

    /// 注入审计与指标协作对象的构造方式
    pub fn with_hooks(
        name: impl Into<String>,
        config: EventServiceConfig,
        audit: Arc<dyn AuditHook>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Arc<Self> {
        let name = name.into();
        let workers = WorkerPool::new(format!("{name}-workers"), config.effective_workers());
        let elastic = ElasticPool::new(format!("{name}-unblocked"));
        Arc::new(Self {
            name,
            registry: SubscriptionRegistry::new(),
            chains: ChainTracker::new(),
            workers,
            elastic,
            audit,
            metrics,
            dispatcher: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 注册订阅者种类（`Default` 构造为工厂）；重复注册为 no-op
    pub fn subscribe<E, S>(&self)
    where
        E: Event,
        S: Subscriber + Default + 'static,
    {
        self.registry
            .subscribe(EventKind::of::<E>(), SubscriberKind::of::<S>());
    }

    /// 以显式工厂注册订阅者种类，工厂可携带注入的协作对象
    pub fn subscribe_with<E, S, F>(&self, factory: F)
    where
        E: Event,
        S: Subscriber + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.registry
            .subscribe(EventKind::of::<E>(), SubscriberKind::from_factory(factory));
    }

    /// 从所有事件种类下移除该订阅者种类
    pub fn unsubscribe<S: Any>(&self) {
        self.registry.unsubscribe(TypeId::of::<S>());
    }

    pub fn has_subscriptions(&self, event: &dyn Event) -> bool {
        self.registry.has_subscriptions(event.kind())
    }

    /// 该链组是否仍在本服务处理中
    pub fn is_chain_in_process(&self, group: ChainGroupId) -> bool {
        self.chains.is_chain_in_process(group)
    }

    /// 发布事件
    ///
    /// 从不在调用线程上等待订阅者执行；仅在链准入的单锁上做 O(1) 短暂阻塞。
    /// 无订阅者与 singleton 冲突都不是错误；服务已 shutdown 时返回硬错误。
    pub fn publish(&self, event: Arc<dyn Event>) -> EventResult<()> {
        let kind = event.kind();
        let subscribers = self.registry.subscribers(kind);
        if subscribers.is_empty() {
            debug!(
                service = %self.name,
                event = kind.name(),
                "no subscribers registered, dropping event"
            );
            return Ok(());
        }

        // 链准入按事件判定一次，对该事件的全部订阅者整体生效
        let guard = match event.chain() {
            Some(link) => {
                if !self.chains.try_begin(link) {
                    info!(
                        service = %self.name,
                        event = kind.name(),
                        chain = %link.group(),
                        "singleton chain already in flight, dropping event"
                    );
                    return Ok(());
                }
                Some(Arc::new(ChainGuard::new(
                    self.chains.clone(),
                    link.group(),
                    link.member(),
                )))
            }
            None => None,
        };

        let unblocked = event.is_unblocked();
        for subscriber in subscribers {
            let task = self.subscriber_task(event.clone(), subscriber, guard.clone());
            if unblocked {
                self.elastic.submit(task)?;
            } else {
                self.workers.submit(task)?;
            }
        }

        self.metrics.count(
            "events_published",
            &[("event", kind.name()), ("publisher", self.name.as_str())],
        );
        Ok(())
    }

    fn subscriber_task(
        &self,
        event: Arc<dyn Event>,
        subscriber: SubscriberKind,
        guard: Option<Arc<ChainGuard>>,
    ) -> BoxFuture<'static, ()> {
        let service = self.name.clone();
        let audit = self.audit.clone();
        let dispatcher = self.dispatcher.get().cloned();

        Box::pin(async move {
            // 守卫随任务存续；最后一个持有者结束时释放链登记
            let _guard = guard;

            audit.subscriber_started(subscriber.name());
            let outcome = AssertUnwindSafe(async {
                let mut instance = subscriber.instantiate();
                instance.inform(event.as_ref()).await
            })
            .catch_unwind()
            .await;
            audit.subscriber_completed(subscriber.name());

            match outcome {
                Ok(Ok(())) => {
                    debug!(
                        service = %service,
                        subscriber = subscriber.name(),
                        event = event.kind().name(),
                        "subscriber informed"
                    );
                    if let Some(link) = event.chain() {
                        Self::dispatch_callbacks(link.on_success(), &dispatcher, &service);
                    }
                }
                Ok(Err(err)) => {
                    error!(
                        service = %service,
                        subscriber = subscriber.name(),
                        event = event.kind().name(),
                        error = %err,
                        "subscriber failed"
                    );
                    if let Some(link) = event.chain() {
                        Self::dispatch_callbacks(link.on_failure(), &dispatcher, &service);
                    }
                }
                Err(panic) => {
                    error!(
                        service = %service,
                        subscriber = subscriber.name(),
                        event = event.kind().name(),
                        reason = panic_reason(panic.as_ref()),
                        "subscriber panicked"
                    );
                    if let Some(link) = event.chain() {
                        Self::dispatch_callbacks(link.on_failure(), &dispatcher, &service);
                    }
                }
            }
        })
    }

    /// 按序派发链回调：显式目标直接发布，否则经挂接的分发门面路由
    fn dispatch_callbacks(
        callbacks: &[ChainCallback],
        dispatcher: &Option<Weak<EventDispatcher>>,
        service: &str,
    ) {
        for callback in callbacks {
            let event = callback.event();
            let result = match callback.target() {
                Some(target) => target.publish(event),
                None => match dispatcher.as_ref().and_then(Weak::upgrade) {
                    Some(dispatcher) => dispatcher.dispatch(event),
                    None => {
                        error!(
                            service = %service,
                            event = callback.event().kind().name(),
                            "no dispatcher attached, chained event dropped"
                        );
                        continue;
                    }
                },
            };
            if let Err(err) = result {
                warn!(
                    service = %service,
                    event = callback.event().kind().name(),
                    error = %err,
                    "failed to publish chained event"
                );
            }
        }
    }

    /// 停止两个执行池接收新提交；已排队与在途任务继续执行
    pub fn shutdown(&self) {
        info!(service = %self.name, "event service shutting down");
        self.workers.shutdown();
        self.elastic.shutdown();
    }

    /// shutdown 并在限时内等待排空
    ///
    /// 全部执行池终止返回 true；超时返回 false（告警携带各池诊断）。
    pub async fn shutdown_timeout(&self, timeout: Duration) -> bool {
        self.shutdown();
        await_drained(
            || vec![self.workers.stats(), self.elastic.stats()],
            timeout,
        )
        .await
    }

    pub(crate) fn attach_dispatcher(&self, dispatcher: &Arc<EventDispatcher>) {
        let _ = self.dispatcher.set(Arc::downgrade(dispatcher));
    }
}

fn panic_reason<'a>(panic: &'a (dyn Any + Send + 'static)) -> &'a str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
