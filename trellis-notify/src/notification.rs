//! 通知模型（Notification）
//!
//! 面向使用者告警的粗粒度值对象，区别于内部工作单元的事件：
//! 发布后不可变，无链、无 singleton 语义。
//!
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// 通知严重级别
///
/// 排序（ERROR < WARNING < INFORMATIONAL < DEBUG < QUIET）仅用于
/// 匹配与展示，不做升级处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NotificationLevel {
    Error,
    Warning,
    Informational,
    Debug,
    Quiet,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Warning => "WARNING",
            NotificationLevel::Informational => "INFORMATIONAL",
            NotificationLevel::Debug => "DEBUG",
            NotificationLevel::Quiet => "QUIET",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct Notification {
    /// 通知作用域（如 "SYSTEM"、"USER"）
    scope: String,
    /// 通知分组（如 "GENERAL"）
    group: String,
    /// 严重级别
    level: NotificationLevel,
    /// 标题
    title: String,
    /// 正文（自由文本）
    content: String,
    /// 发布时间
    #[builder(default = Utc::now())]
    timestamp: DateTime<Utc>,
    /// 任意主题负载
    #[builder(default = Value::Null)]
    subject: Value,
}

impl Notification {
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn level(&self) -> NotificationLevel {
        self.level
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }
}
