//! 订阅者（Subscriber）
//!
//! 订阅者每次投递都由零参工厂新建实例，实例间不共享状态，
//! 因此 `inform` 可安全地取 `&mut self`。
//!
use crate::event::Event;
use async_trait::async_trait;
use std::any::{TypeId, type_name};
use std::sync::Arc;

/// 订阅者：处理某一类事件
#[async_trait]
pub trait Subscriber: Send {
    /// 处理事件；错误在管线内部消化并路由到失败回调
    async fn inform(&mut self, event: &dyn Event) -> anyhow::Result<()>;
}

type SubscriberFactory = Arc<dyn Fn() -> Box<dyn Subscriber> + Send + Sync>;

/// 订阅者种类：TypeId 身份 + 类型名 + 零参工厂
///
/// 订阅表以种类为单位去重；工厂在每次投递时调用。
#[derive(Clone)]
pub struct SubscriberKind {
    id: TypeId,
    name: &'static str,
    factory: SubscriberFactory,
}

impl SubscriberKind {
    /// 以 `Default` 构造为工厂的便捷注册方式
    pub fn of<S>() -> Self
    where
        S: Subscriber + Default + 'static,
    {
        Self::from_factory(S::default)
    }

    /// 显式工厂注册：工厂可携带注入的协作对象
    pub fn from_factory<S, F>(factory: F) -> Self
    where
        S: Subscriber + 'static,
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

    /// 新建一个实例（每次投递恰好一次）
    pub fn instantiate(&self) -> Box<dyn Subscriber> {
        (self.factory)()
    }
}
