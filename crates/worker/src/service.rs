use std::sync::Arc;

use router_config::models::WorkerConfig;
use router_core::{WorkItem, WorkerCommand, WorkerEvent, WorkerEventSender, WorkerHandle};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::task_execution::{simulate, SimulationProfile, WorkerStats};

/// 模拟Worker
///
/// 每个工作项在独立任务中执行，并发数受 `max_concurrent_tasks` 限制，超出的工作项排队等待。
/// 收到 `Stop` 或命令通道关闭后中止所有在途工作项。
pub struct SimulatedWorker {
    worker_id: String,
    profile: SimulationProfile,
    stats: Arc<WorkerStats>,
    permits: Arc<Semaphore>,
    events: WorkerEventSender,
}

impl SimulatedWorker {
    pub fn new(worker_id: &str, config: &WorkerConfig, events: WorkerEventSender) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            profile: SimulationProfile::from_config(config),
            stats: Arc::new(WorkerStats::new()),
            permits: Arc::new(Semaphore::new(config.max_concurrent_tasks.max(1))),
            events,
        }
    }

    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// 启动Worker循环，返回交给分发器的句柄
    pub fn spawn(self) -> WorkerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = WorkerHandle::new(self.worker_id.clone(), tx);
        tokio::spawn(self.run(rx));
        handle
    }

    async fn run(self, mut commands: mpsc::UnboundedReceiver<WorkerCommand>) {
        let mut in_flight = JoinSet::new();
        info!(worker_id = %self.worker_id, "模拟Worker启动");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(WorkerCommand::Dispatch(item)) => self.start(&mut in_flight, item),
                    Some(WorkerCommand::RequestMetrics(reply)) => {
                        let available = self.permits.available_permits() > 0;
                        let _ = reply.send(self.stats.snapshot(&self.worker_id, available));
                    }
                    Some(WorkerCommand::Stop) | None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            warn!(worker_id = %self.worker_id, "模拟任务异常退出: {}", e);
                        }
                    }
                }
            }
        }

        let aborted = abort_in_flight(&mut in_flight, &self.stats).await;
        info!(
            worker_id = %self.worker_id,
            aborted,
            processed = self.stats.tasks_processed(),
            "模拟Worker停止"
        );
    }

    fn start(&self, in_flight: &mut JoinSet<()>, item: WorkItem) {
        self.stats.task_accepted();
        debug!(worker_id = %self.worker_id, task_id = %item.task_id, "接收工作项");

        let worker_id = self.worker_id.clone();
        let profile = self.profile.clone();
        let stats = Arc::clone(&self.stats);
        let permits = Arc::clone(&self.permits);
        let events = self.events.clone();

        in_flight.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                stats.task_aborted();
                return;
            };
            let result = simulate(&worker_id, &item, &profile).await;
            stats.task_finished(result.processing_time_ms);
            let _ = events.send(WorkerEvent::Completed {
                task_id: item.task_id,
                worker_id,
                result,
            });
        });
    }
}

/// 中止所有在途工作项，只为真正被取消的工作项释放负载
///
/// 已执行完但尚未被回收的任务在 `task_finished` 中释放过负载，不再重复计数。
async fn abort_in_flight(in_flight: &mut JoinSet<()>, stats: &WorkerStats) -> usize {
    in_flight.abort_all();
    let mut aborted = 0;
    while let Some(joined) = in_flight.join_next().await {
        match joined {
            Err(e) if e.is_cancelled() => {
                stats.task_aborted();
                aborted += 1;
            }
            Err(e) => warn!("模拟任务异常退出: {}", e),
            Ok(()) => {}
        }
    }
    aborted
}
