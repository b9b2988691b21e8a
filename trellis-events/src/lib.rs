//! 进程内异步事件分发核心（trellis-events）
//!
//! 为无状态 REST 服务骨架提供发布/订阅引擎，把请求处理代码与
//! 后台工作解耦：
//! - 订阅表（`registry`）：事件种类 -> 订阅者种类有序列表；
//! - 链跟踪（`chain`）：singleton 互斥与在途记账；
//! - 发布管线（`service`）：查表、准入、路由、提交、计数，
//!   成功/失败回调跨服务路由；
//! - 执行池（`pool`）：有界工作池 + 弹性池，带限时排空的优雅关闭；
//! - 分发门面（`dispatcher`）：向所有持有订阅的服务实例扇出；
//! - 外部协作（`hooks`）：审计与指标均为可注入接口。
//!
//! 本 crate 只定义进程内分发语义，不绑定任何传输、存储或指标后端。
//!
pub mod chain;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod hooks;
pub mod pool;
pub mod registry;
pub mod service;
pub mod subscriber;

pub use chain::ChainTracker;
pub use config::EventServiceConfig;
pub use dispatcher::EventDispatcher;
pub use error::{EventError, EventResult};
pub use event::{ChainCallback, ChainGroupId, ChainLink, ChainMemberId, Event, EventKind};
pub use hooks::{AuditHook, MetricsSink, NoopAudit, NoopMetrics};
pub use pool::{ElasticPool, PoolStats, WorkerPool, await_drained};
pub use registry::SubscriptionRegistry;
pub use service::EventService;
pub use subscriber::{Subscriber, SubscriberKind};
