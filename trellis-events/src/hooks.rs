//! 外部协作接口（hooks）
//!
//! 审计与指标均为可注入协作对象，核心不绑定任何具体存储或后端；
//! 默认提供 no-op 实现。钩子在工作线程任务内同步调用，实现方自行
//! 决定是否转投异步通道。
//!
/// 审计协作：围绕每次订阅者调用记录“开始/完成”追加式轨迹
pub trait AuditHook: Send + Sync {
    fn subscriber_started(&self, subscriber: &str);

    fn subscriber_completed(&self, subscriber: &str);
}

/// 默认审计实现：不记录
pub struct NoopAudit;

impl AuditHook for NoopAudit {
    fn subscriber_started(&self, _subscriber: &str) {}

    fn subscriber_completed(&self, _subscriber: &str) {}
}

/// 指标协作：带标签的计数器汇
pub trait MetricsSink: Send + Sync {
    fn count(&self, name: &str, labels: &[(&str, &str)]);
}

/// 默认指标实现：丢弃
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn count(&self, _name: &str, _labels: &[(&str, &str)]) {}
}
