//! 事件模型（Event）
//!
//! 定义事件能力协议与链标识：
//! - `Event`：对象安全的事件协议，身份经由 `EventKind`（TypeId + 类型名）表达；
//! - `ChainLink`：可链事件携带的链标识（组 ID / 成员 ID / singleton 标志）
//!   与成功/失败回调列表；
//! - 回调目标在事件构造时解析为具体服务句柄，不做运行期服务定位。
//!
use crate::service::EventService;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 事件种类：以 TypeId 为检索键，类型名仅用于日志
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EventKind {
    id: TypeId,
    name: &'static str,
}

impl EventKind {
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// 事件协议
///
/// 具体事件为用户自定义的值对象，`kind` 通常实现为
/// `EventKind::of::<Self>()`。两条彼此独立的扩展轴：
/// - `chain`：返回链标识即成为可链事件（携带回调与 singleton 语义）；
/// - `is_unblocked`：标记为真时路由到弹性池，不与有界队列排队。
pub trait Event: Any + Send + Sync {
    fn kind(&self) -> EventKind;

    fn as_any(&self) -> &dyn Any;

    fn chain(&self) -> Option<&ChainLink> {
        None
    }

    fn is_unblocked(&self) -> bool {
        false
    }
}

/// 链组 ID：同一条链的全部事件共享
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChainGroupId(Uuid);

impl ChainGroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChainGroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChainGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 链成员 ID：链内单个事件的唯一标识
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChainMemberId(Uuid);

impl ChainMemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChainMemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChainMemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 链回调：订阅者执行结束后要派发的后续事件
///
/// `target` 为空时经由所属服务挂接的分发门面路由。
#[derive(Clone)]
pub struct ChainCallback {
    event: Arc<dyn Event>,
    target: Option<Arc<EventService>>,
}

impl ChainCallback {
    pub fn event(&self) -> Arc<dyn Event> {
        self.event.clone()
    }

    pub fn target(&self) -> Option<&Arc<EventService>> {
        self.target.as_ref()
    }
}

/// 链标识：组 ID、本事件的成员 ID、singleton 标志与回调列表
///
/// 成员 ID 在构造时生成；回调按追加顺序派发。
#[derive(Clone)]
pub struct ChainLink {
    group: ChainGroupId,
    member: ChainMemberId,
    singleton: bool,
    on_success: Vec<ChainCallback>,
    on_failure: Vec<ChainCallback>,
}

impl ChainLink {
    pub fn new(group: ChainGroupId) -> Self {
        Self {
            group,
            member: ChainMemberId::new(),
            singleton: false,
            on_success: Vec::new(),
            on_failure: Vec::new(),
        }
    }

    /// 声明 singleton 语义：同组已有成员在途时，本事件直接丢弃
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    /// 追加成功回调，经分发门面路由
    pub fn then(mut self, event: Arc<dyn Event>) -> Self {
        self.on_success.push(ChainCallback {
            event,
            target: None,
        });
        self
    }

    /// 追加成功回调，定向派发到指定服务
    pub fn then_on(mut self, event: Arc<dyn Event>, target: Arc<EventService>) -> Self {
        self.on_success.push(ChainCallback {
            event,
            target: Some(target),
        });
        self
    }

    /// 追加失败回调，经分发门面路由
    pub fn or_else(mut self, event: Arc<dyn Event>) -> Self {
        self.on_failure.push(ChainCallback {
            event,
            target: None,
        });
        self
    }

    /// 追加失败回调，定向派发到指定服务
    pub fn or_else_on(mut self, event: Arc<dyn Event>, target: Arc<EventService>) -> Self {
        self.on_failure.push(ChainCallback {
            event,
            target: Some(target),
        });
        self
    }

    pub fn group(&self) -> ChainGroupId {
        self.group
    }

    pub fn member(&self) -> ChainMemberId {
        self.member
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn on_success(&self) -> &[ChainCallback] {
        &self.on_success
    }

    pub fn on_failure(&self) -> &[ChainCallback] {
        &self.on_failure
    }
}
