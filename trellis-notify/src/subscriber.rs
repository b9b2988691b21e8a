//! 通知订阅者（NotificationSubscriber）
//!
//! 与事件订阅者同构：每次投递由零参工厂新建实例。
//!
use crate::notification::Notification;
use async_trait::async_trait;
use std::any::{TypeId, type_name};
use std::sync::Arc;

/// 通知订阅者：消费一条通知
#[async_trait]
pub trait NotificationSubscriber: Send {
    async fn notify(&mut self, notification: &Notification) -> anyhow::Result<()>;
}

type NotificationFactory = Arc<dyn Fn() -> Box<dyn NotificationSubscriber> + Send + Sync>;

/// 通知订阅者种类：TypeId 身份 + 类型名 + 零参工厂
#[derive(Clone)]
pub struct NotificationSubscriberKind {
    id: TypeId,
    name: &'static str,
    factory: NotificationFactory,
}

impl NotificationSubscriberKind {
    pub fn of<S>() -> Self
    where
        S: NotificationSubscriber + Default + 'static,
    {
        Self::from_factory(S::default)
    }

    pub fn from_factory<S, F>(factory: F) -> Self
    where
        S: NotificationSubscriber + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
            factory: Arc::new(move || Box::new(factory())),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instantiate(&self) -> Box<dyn NotificationSubscriber> {
        (self.factory)()
    }
}
