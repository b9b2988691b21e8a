//! 执行池（pool）
//!
//! 两种执行器与统一的排空等待：
//! - `WorkerPool`：有界多工作者池，N 个工作者任务消费共享 mpsc 队列，
//!   维护 queued/active 计量供排空诊断；
//! - `ElasticPool`：弹性执行器，直接投给 tokio 调度器（工作窃取、
//!   规模随可用并行度），经 `TaskTracker` 跟踪在途任务，永不排队；
//! - `await_drained`：有界间隔轮询的排空等待，周期性输出进度，
//!   超时时告警并携带各池的队列深度与活跃计数。
//!
//! shutdown 语义：停止接收新提交，已排队与在途任务继续执行完毕。
//! 不提供任务中途取消。
//!
use crate::error::{EventError, EventResult};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

type Job = BoxFuture<'static, ()>;

/// 单个执行池的瞬时状态快照
#[derive(Clone, Debug)]
pub struct PoolStats {
    pub name: String,
    pub queued: usize,
    pub active: usize,
    pub terminated: bool,
}

/// 有界多工作者池
///
/// 需在 Tokio 运行时内构造（构造即派生工作者任务）。
pub struct WorkerPool {
    name: String,
    tx: StdMutex<Option<mpsc::UnboundedSender<Job>>>,
    queued: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(name: impl Into<String>, worker_count: usize) -> Self {
        let name = name.into();
        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let queued = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(worker_count.max(1));
        for _ in 0..worker_count.max(1) {
            let rx = rx.clone();
            let queued = queued.clone();
            let active = active.clone();
            workers.push(tokio::spawn(async move {
                loop {
                    // 锁仅覆盖出队；任务执行在锁外，其他工作者可继续取活
                    let job = {
                        let mut guard = rx.lock().await;
                        guard.recv().await
                    };
                    let Some(job) = job else { break };
                    queued.fetch_sub(1, Ordering::Relaxed);
                    active.fetch_add(1, Ordering::Relaxed);
                    job.await;
                    active.fetch_sub(1, Ordering::Relaxed);
                }
            }));
        }

        Self {
            name,
            tx: StdMutex::new(Some(tx)),
            queued,
            active,
            workers,
        }
    }

    /// 入队一个任务；池已关闭时返回错误
    pub fn submit(&self, job: Job) -> EventResult<()> {
        let guard = self.tx.lock().expect("worker pool sender lock");
        match guard.as_ref() {
            Some(tx) => {
                self.queued.fetch_add(1, Ordering::Relaxed);
                if tx.send(job).is_err() {
                    self.queued.fetch_sub(1, Ordering::Relaxed);
                    return Err(EventError::PoolClosed {
                        pool: self.name.clone(),
                    });
                }
                Ok(())
            }
            None => Err(EventError::PoolClosed {
                pool: self.name.clone(),
            }),
        }
    }

    /// 停止接收新提交；队列中与在途的任务继续执行
    pub fn shutdown(&self) {
        self.tx.lock().expect("worker pool sender lock").take();
    }

    /// 全部工作者是否已退出（仅在 shutdown 且队列排空后成立）
    pub fn is_terminated(&self) -> bool {
        self.workers.iter().all(|worker| worker.is_finished())
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            name: self.name.clone(),
            queued: self.queued.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
            terminated: self.is_terminated(),
        }
    }
}

/// 弹性执行器：永不排队，"unblocked" 事件专用
pub struct ElasticPool {
    name: String,
    tracker: TaskTracker,
}

impl ElasticPool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracker: TaskTracker::new(),
        }
    }

    pub fn submit(&self, job: Job) -> EventResult<()> {
        if self.tracker.is_closed() {
            return Err(EventError::PoolClosed {
                pool: self.name.clone(),
            });
        }
        self.tracker.spawn(job);
        Ok(())
    }

    pub fn shutdown(&self) {
        self.tracker.close();
    }

    pub fn is_terminated(&self) -> bool {
        self.tracker.is_closed() && self.tracker.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            name: self.name.clone(),
            queued: 0,
            active: self.tracker.len(),
            terminated: self.is_terminated(),
        }
    }
}

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(200);
// 约每 3 秒输出一次排空进度
const DRAIN_PROGRESS_TICKS: u32 = 15;

/// 等待一组执行池全部终止
///
/// 轮询 `probe` 直至全部 terminated（返回 true）或超时（返回 false，
/// 告警附带各池诊断）。有界 sleep 轮询，不忙等。
pub async fn await_drained<F>(mut probe: F, timeout: Duration) -> bool
where
    F: FnMut() -> Vec<PoolStats>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    let mut ticks: u32 = 0;

    loop {
        let stats = probe();
        if stats.iter().all(|pool| pool.terminated) {
            return true;
        }

        let now = tokio::time::Instant::now();
        if now >= deadline {
            for pool in &stats {
                warn!(
                    pool = %pool.name,
                    queued = pool.queued,
                    active = pool.active,
                    "shutdown timed out before pool drained"
                );
            }
            return false;
        }

        ticks += 1;
        if ticks % DRAIN_PROGRESS_TICKS == 0 {
            for pool in &stats {
                info!(
                    pool = %pool.name,
                    queued = pool.queued,
                    active = pool.active,
                    "waiting for pool to drain"
                );
            }
        }

        let remaining = deadline - now;
        tokio::time::sleep(DRAIN_POLL_INTERVAL.min(remaining)).await;
    }
}
