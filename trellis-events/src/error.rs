//! 事件核心统一错误定义
//!
//! 仅覆盖“误配置”类硬错误：订阅者自身的失败在投递管线内部消化，
//! 永远不会经由 `publish` 抛回调用方。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventError {
    /// 执行池已停止接收新任务（服务已 shutdown 后仍在 publish）
    #[error("pool closed: {pool}")]
    PoolClosed { pool: String },

    /// 分发门面构造时未提供任何事件服务实例
    #[error("no event services attached to dispatcher")]
    NoServices,
}

/// 统一 Result 类型别名
pub type EventResult<T> = Result<T, EventError>;
