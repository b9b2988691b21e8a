//! 订阅过滤器（SubscriptionFilter）
//!
//! 可选的 (scope, group, level) 三元组：对每个非空字段做精确相等匹配，
//! 多个非空字段之间取 AND；全空过滤器匹配一切通知。
//!
use crate::notification::{Notification, NotificationLevel};
use bon::Builder;

#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct SubscriptionFilter {
    scope: Option<String>,
    group: Option<String>,
    level: Option<NotificationLevel>,
}

impl SubscriptionFilter {
    /// 全空过滤器：匹配一切
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        if let Some(scope) = &self.scope {
            if scope != notification.scope() {
                return false;
            }
        }
        if let Some(group) = &self.group {
            if group != notification.group() {
                return false;
            }
        }
        if let Some(level) = self.level {
            if level != notification.level() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification::builder()
            .scope("SYSTEM".into())
            .group("GENERAL".into())
            .level(NotificationLevel::Informational)
            .title("t".into())
            .content("c".into())
            .build()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(SubscriptionFilter::any().matches(&notification()));
    }

    #[test]
    fn group_only_filter_ignores_scope_and_level() {
        let filter = SubscriptionFilter::builder().group("GENERAL".into()).build();
        assert!(filter.matches(&notification()));

        let other = SubscriptionFilter::builder().group("SECURITY".into()).build();
        assert!(!other.matches(&notification()));
    }

    #[test]
    fn full_filter_requires_exact_combination() {
        let exact = SubscriptionFilter::builder()
            .scope("SYSTEM".into())
            .group("GENERAL".into())
            .level(NotificationLevel::Informational)
            .build();
        assert!(exact.matches(&notification()));

        let wrong_level = SubscriptionFilter::builder()
            .scope("SYSTEM".into())
            .group("GENERAL".into())
            .level(NotificationLevel::Error)
            .build();
        assert!(!wrong_level.matches(&notification()));
    }
}
