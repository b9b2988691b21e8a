//! 链跟踪器（ChainTracker）
//!
//! 进程级在途账本：链组 ID -> 在途成员 ID 集合。
//! - 准入（`try_begin`）与释放（`end`）的读改写在单锁内完成；
//! - 不变式：组条目存在当且仅当其集合非空，最后一个成员完成时整组移除；
//! - singleton 语义在准入处判定：同组已有在途成员则拒绝记录。
//!
//! 链基数很小，这里以正确性优先，单锁串行化足够。
//!
use crate::event::{ChainGroupId, ChainLink, ChainMemberId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct ChainTracker {
    inner: Arc<Mutex<HashMap<ChainGroupId, HashSet<ChainMemberId>>>>,
}

impl ChainTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试登记在途成员
    ///
    /// singleton 且同组已有在途成员时返回 `false` 且不做任何记录，
    /// 调用方应整体跳过该事件的派发。
    pub fn try_begin(&self, link: &ChainLink) -> bool {
        let mut groups = self.inner.lock().expect("chain tracker lock");
        if link.is_singleton()
            && groups
                .get(&link.group())
                .is_some_and(|members| !members.is_empty())
        {
            return false;
        }
        groups.entry(link.group()).or_default().insert(link.member());
        true
    }

    /// 注销在途成员；集合空则移除整个组条目
    pub fn end(&self, group: ChainGroupId, member: ChainMemberId) {
        let mut groups = self.inner.lock().expect("chain tracker lock");
        if let Some(members) = groups.get_mut(&group) {
            members.remove(&member);
            if members.is_empty() {
                groups.remove(&group);
            }
        }
    }

    /// 该链组是否仍有成员在途
    pub fn is_chain_in_process(&self, group: ChainGroupId) -> bool {
        self.inner
            .lock()
            .expect("chain tracker lock")
            .get(&group)
            .is_some_and(|members| !members.is_empty())
    }
}

/// 链释放守卫：Drop 时注销成员登记
///
/// 同一次 publish 的全部订阅者任务共享一个 `Arc<ChainGuard>`，
/// 最后一个任务结束（无论成功、失败或提交被拒）时释放，等价于 finally。
pub(crate) struct ChainGuard {
    tracker: ChainTracker,
    group: ChainGroupId,
    member: ChainMemberId,
}

impl ChainGuard {
    pub(crate) fn new(tracker: ChainTracker, group: ChainGroupId, member: ChainMemberId) -> Self {
        Self {
            tracker,
            group,
            member,
        }
    }
}

impl Drop for ChainGuard {
    fn drop(&mut self) {
        self.tracker.end(self.group, self.member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_collision_is_rejected_without_recording() {
        let tracker = ChainTracker::new();
        let group = ChainGroupId::new();
        let first = ChainLink::new(group).singleton();
        let second = ChainLink::new(group).singleton();

        assert!(tracker.try_begin(&first));
        assert!(!tracker.try_begin(&second));
        assert!(tracker.is_chain_in_process(group));

        // 被拒的成员不应留下任何登记
        tracker.end(group, first.member());
        assert!(!tracker.is_chain_in_process(group));
    }

    #[test]
    fn non_singleton_members_run_in_parallel() {
        let tracker = ChainTracker::new();
        let group = ChainGroupId::new();
        let first = ChainLink::new(group);
        let second = ChainLink::new(group);

        assert!(tracker.try_begin(&first));
        assert!(tracker.try_begin(&second));

        tracker.end(group, first.member());
        assert!(tracker.is_chain_in_process(group));
        tracker.end(group, second.member());
        assert!(!tracker.is_chain_in_process(group));
    }

    #[test]
    fn unrelated_groups_do_not_block_each_other() {
        let tracker = ChainTracker::new();
        let a = ChainLink::new(ChainGroupId::new()).singleton();
        let b = ChainLink::new(ChainGroupId::new()).singleton();

        assert!(tracker.try_begin(&a));
        assert!(tracker.try_begin(&b));
    }

    #[test]
    fn guard_releases_on_drop() {
        let tracker = ChainTracker::new();
        let group = ChainGroupId::new();
        let link = ChainLink::new(group);
        assert!(tracker.try_begin(&link));

        let guard = Arc::new(ChainGuard::new(tracker.clone(), group, link.member()));
        let clone = guard.clone();
        drop(guard);
        assert!(tracker.is_chain_in_process(group));
        drop(clone);
        assert!(!tracker.is_chain_in_process(group));
    }
}
