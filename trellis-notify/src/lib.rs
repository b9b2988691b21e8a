//! 通知广播框架（trellis-notify）
//!
//! 在事件核心之上提供面向使用者告警的粗粒度扇出：
//! - `Notification`：不可变通知值对象（作用域/分组/级别/标题/正文/主题负载）；
//! - `SubscriptionFilter`：(scope, group, level) 非空字段精确匹配；
//! - `NotificationService`：过滤匹配 + 定长小池投递，与事件服务
//!   共用执行池与审计/指标协作接口。
//!
pub mod filter;
pub mod notification;
pub mod service;
pub mod subscriber;

pub use filter::SubscriptionFilter;
pub use notification::{Notification, NotificationLevel};
pub use service::NotificationService;
pub use subscriber::{NotificationSubscriber, NotificationSubscriberKind};
