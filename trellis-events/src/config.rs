//! 事件服务配置
//!
use std::thread;

/// 工作池规模配置
///
/// 生效线程数 = 显式指定值，否则 CPU 核数 × 倍率，下限 1。
#[derive(Clone, Copy, Debug)]
pub struct EventServiceConfig {
    /// 显式工作线程数；为空时按核数推导
    pub worker_count: Option<usize>,
    /// 核数倍率
    pub core_multiplier: usize,
    /// CPU 核数；为空时取运行环境的可用并行度
    pub cores: Option<usize>,
}

impl Default for EventServiceConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            core_multiplier: 2,
            cores: None,
        }
    }
}

impl EventServiceConfig {
    pub fn effective_workers(&self) -> usize {
        if let Some(count) = self.worker_count {
            return count.max(1);
        }
        let cores = self
            .cores
            .unwrap_or_else(|| thread::available_parallelism().map(|n| n.get()).unwrap_or(1));
        (cores * self.core_multiplier).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_count_wins_over_multiplier() {
        let config = EventServiceConfig {
            worker_count: Some(3),
            core_multiplier: 8,
            cores: Some(16),
        };
        assert_eq!(config.effective_workers(), 3);
    }

    #[test]
    fn derived_count_uses_cores_times_multiplier() {
        let config = EventServiceConfig {
            worker_count: None,
            core_multiplier: 2,
            cores: Some(4),
        };
        assert_eq!(config.effective_workers(), 8);
    }

    #[test]
    fn worker_count_never_below_one() {
        let config = EventServiceConfig {
            worker_count: Some(0),
            core_multiplier: 0,
            cores: Some(0),
        };
        assert_eq!(config.effective_workers(), 1);

        let derived = EventServiceConfig {
            worker_count: None,
            core_multiplier: 0,
            cores: Some(8),
        };
        assert_eq!(derived.effective_workers(), 1);
    }
}
