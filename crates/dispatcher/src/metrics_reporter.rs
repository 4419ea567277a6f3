use std::time::Duration;

use futures::future::join_all;
use router_core::{RouterMetrics, RoutingStrategy, TaskResult, WorkerHandle, WorkerMetricsSnapshot};
use tracing::debug;

/// 路由器累计指标
///
/// `total_tasks_processed` 单调不减，每个回复给调用方的任务计一次（广播任务按聚合结果计一次）。
#[derive(Debug, Default)]
pub struct MetricsReporter {
    total_tasks_processed: u64,
    total_processing_time_ms: u64,
}

impl MetricsReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &TaskResult) {
        self.total_tasks_processed += 1;
        self.total_processing_time_ms = self
            .total_processing_time_ms
            .saturating_add(result.processing_time_ms);
    }

    pub fn total_tasks_processed(&self) -> u64 {
        self.total_tasks_processed
    }

    /// 平均处理耗时，尚无任务时为0
    pub fn average_processing_time_ms(&self) -> f64 {
        if self.total_tasks_processed == 0 {
            0.0
        } else {
            self.total_processing_time_ms as f64 / self.total_tasks_processed as f64
        }
    }

    pub fn router_metrics(
        &self,
        tasks_in_progress: usize,
        worker_count: usize,
        routing_strategy: RoutingStrategy,
    ) -> RouterMetrics {
        RouterMetrics {
            total_tasks_processed: self.total_tasks_processed,
            tasks_in_progress,
            average_processing_time_ms: self.average_processing_time_ms(),
            worker_count,
            routing_strategy,
        }
    }
}

/// 向每个Worker请求指标快照，在后台并发等待，每个请求最多等待 `timeout`
///
/// 不阻塞调用方。超时或已退出的Worker不产生快照，保留其旧值或默认值。
/// 收集到的快照整体交给 `sink`。
pub fn spawn_refresh<F>(workers: &[WorkerHandle], timeout: Duration, sink: F)
where
    F: FnOnce(Vec<WorkerMetricsSnapshot>) + Send + 'static,
{
    let requests: Vec<_> = workers
        .iter()
        .map(|worker| (worker.id().to_string(), worker.request_metrics()))
        .collect();

    tokio::spawn(async move {
        let replies = join_all(requests.into_iter().map(|(worker_id, rx)| async move {
            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(snapshot)) => Some(snapshot),
                Ok(Err(_)) => {
                    debug!(worker_id = %worker_id, "Worker未回复指标请求");
                    None
                }
                Err(_) => {
                    debug!(worker_id = %worker_id, "Worker指标请求超时");
                    None
                }
            }
        }))
        .await;

        sink(replies.into_iter().flatten().collect());
    });
}
