//! 分发门面（EventDispatcher）
//!
//! 将一次发布扇出到所有持有该事件订阅的服务实例，调用方无需关心
//! 哪个池处理哪类事件。门面本身不持有状态；同一事件种类可以同时
//! 在多个服务上有订阅，各实例都会收到。
//!
use crate::error::{EventError, EventResult};
use crate::event::{ChainGroupId, Event};
use crate::service::EventService;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct EventDispatcher {
    services: Vec<Arc<EventService>>,
}

impl EventDispatcher {
    /// 以存活的服务实例集合构造门面
    ///
    /// 空集合视为误配置，立即报错。构造时向各服务挂接弱引用，
    /// 供未指定目标的链回调路由。
    pub fn new(services: Vec<Arc<EventService>>) -> EventResult<Arc<Self>> {
        if services.is_empty() {
            return Err(EventError::NoServices);
        }
        let dispatcher = Arc::new(Self { services });
        for service in &dispatcher.services {
            service.attach_dispatcher(&dispatcher);
        }
        Ok(dispatcher)
    }

    /// 发布到每个持有非空订阅列表的服务实例；无人接收仅记 debug
    pub fn dispatch(&self, event: Arc<dyn Event>) -> EventResult<()> {
        let mut taken = false;
        let mut first_err = None;
        for service in &self.services {
            if service.has_subscriptions(event.as_ref()) {
                taken = true;
                if let Err(err) = service.publish(event.clone()) {
                    warn!(
                        service = service.name(),
                        event = event.kind().name(),
                        error = %err,
                        "dispatch to service failed"
                    );
                    first_err.get_or_insert(err);
                }
            }
        }
        if !taken {
            debug!(
                event = event.kind().name(),
                "no service has subscriptions for event"
            );
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// 任一服务的链跟踪器仍有该组在途成员即为 true
    pub fn is_being_processed(&self, group: ChainGroupId) -> bool {
        self.services
            .iter()
            .any(|service| service.is_chain_in_process(group))
    }
}
