//! 订阅表（SubscriptionRegistry）
//!
//! 事件种类 -> 订阅者种类有序列表的并发映射：
//! - `subscribe`：幂等追加（同种类重复注册为 no-op），保持插入顺序；
//! - `unsubscribe`：从全表移除某订阅者种类；
//! - 读取返回快照，读者不会观察到写到一半的列表（分片锁内完成变更）。
//!
use crate::event::EventKind;
use crate::subscriber::SubscriberKind;
use dashmap::DashMap;
use std::any::TypeId;

pub struct SubscriptionRegistry {
    inner: DashMap<EventKind, Vec<SubscriberKind>>,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 幂等注册：同一 (事件种类, 订阅者种类) 只保留首次注册
    pub fn subscribe(&self, kind: EventKind, subscriber: SubscriberKind) {
        let mut entry = self.inner.entry(kind).or_insert_with(Vec::new);
        if entry.iter().all(|s| s.id() != subscriber.id()) {
            entry.push(subscriber);
        }
    }

    /// 从所有事件种类的列表中移除该订阅者种类；不存在时无副作用
    pub fn unsubscribe(&self, subscriber: TypeId) {
        for mut entry in self.inner.iter_mut() {
            entry.value_mut().retain(|s| s.id() != subscriber);
        }
    }

    /// 订阅者列表快照（按注册顺序）
    pub fn subscribers(&self, kind: EventKind) -> Vec<SubscriberKind> {
        self.inner
            .get(&kind)
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    /// 是否存在非空订阅列表；被 unsubscribe 清空的列表视为无订阅
    pub fn has_subscriptions(&self, kind: EventKind) -> bool {
        self.inner.get(&kind).is_some_and(|list| !list.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::subscriber::Subscriber;
    use async_trait::async_trait;
    use std::any::Any;

    struct PingEvent;
    impl Event for PingEvent {
        fn kind(&self) -> EventKind {
            EventKind::of::<Self>()
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct PongEvent;
    impl Event for PongEvent {
        fn kind(&self) -> EventKind {
            EventKind::of::<Self>()
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct NoopSubscriber;
    #[async_trait]
    impl Subscriber for NoopSubscriber {
        async fn inform(&mut self, _event: &dyn Event) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct OtherSubscriber;
    #[async_trait]
    impl Subscriber for OtherSubscriber {
        async fn inform(&mut self, _event: &dyn Event) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn duplicate_subscription_is_noop() {
        let registry = SubscriptionRegistry::new();
        let kind = EventKind::of::<PingEvent>();
        registry.subscribe(kind, SubscriberKind::of::<NoopSubscriber>());
        registry.subscribe(kind, SubscriberKind::of::<NoopSubscriber>());

        assert_eq!(registry.subscribers(kind).len(), 1);
    }

    #[test]
    fn subscribers_keep_registration_order() {
        let registry = SubscriptionRegistry::new();
        let kind = EventKind::of::<PingEvent>();
        registry.subscribe(kind, SubscriberKind::of::<NoopSubscriber>());
        registry.subscribe(kind, SubscriberKind::of::<OtherSubscriber>());

        let names: Vec<_> = registry
            .subscribers(kind)
            .iter()
            .map(|s| s.name())
            .collect();
        assert!(names[0].contains("NoopSubscriber"));
        assert!(names[1].contains("OtherSubscriber"));
    }

    #[test]
    fn unsubscribe_removes_from_every_kind() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe(
            EventKind::of::<PingEvent>(),
            SubscriberKind::of::<NoopSubscriber>(),
        );
        registry.subscribe(
            EventKind::of::<PongEvent>(),
            SubscriberKind::of::<NoopSubscriber>(),
        );
        registry.subscribe(
            EventKind::of::<PongEvent>(),
            SubscriberKind::of::<OtherSubscriber>(),
        );

        registry.unsubscribe(TypeId::of::<NoopSubscriber>());

        assert!(registry.subscribers(EventKind::of::<PingEvent>()).is_empty());
        assert_eq!(registry.subscribers(EventKind::of::<PongEvent>()).len(), 1);
    }

    #[test]
    fn emptied_list_counts_as_no_subscriptions() {
        let registry = SubscriptionRegistry::new();
        let kind = EventKind::of::<PingEvent>();
        registry.subscribe(kind, SubscriberKind::of::<NoopSubscriber>());
        assert!(registry.has_subscriptions(kind));

        registry.unsubscribe(TypeId::of::<NoopSubscriber>());
        // 条目仍在表中，但空列表视为无订阅
        assert!(!registry.has_subscriptions(kind));
    }
}
