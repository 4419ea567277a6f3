use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use router_config::models::WorkerConfig;
use router_core::{TaskResult, WorkItem, WorkerMetricsSnapshot};
use tokio::time::Instant;
use tracing::debug;

/// 模拟执行参数
#[derive(Debug, Clone)]
pub struct SimulationProfile {
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub failure_rate: f64,
}

impl SimulationProfile {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            min_latency_ms: config.min_latency_ms,
            max_latency_ms: config.max_latency_ms,
            failure_rate: config.failure_rate,
        }
    }

    /// 在 `[min, max]` 毫秒内均匀取样
    pub fn sample_latency(&self) -> Duration {
        let millis = if self.max_latency_ms <= self.min_latency_ms {
            self.min_latency_ms
        } else {
            rand::rng().random_range(self.min_latency_ms..=self.max_latency_ms)
        };
        Duration::from_millis(millis)
    }

    pub fn should_fail(&self) -> bool {
        rand::rng().random_bool(self.failure_rate.clamp(0.0, 1.0))
    }
}

impl From<&WorkerConfig> for SimulationProfile {
    fn from(config: &WorkerConfig) -> Self {
        Self::from_config(config)
    }
}

/// Worker运行统计
///
/// `current_load` 包含排队等待并发许可的工作项。
#[derive(Debug, Default)]
pub struct WorkerStats {
    tasks_processed: AtomicU64,
    total_processing_time_ms: AtomicU64,
    current_load: AtomicU32,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_accepted(&self) {
        self.current_load.fetch_add(1, Ordering::Relaxed);
    }

    pub fn task_finished(&self, processing_time_ms: u64) {
        self.tasks_processed.fetch_add(1, Ordering::Relaxed);
        self.total_processing_time_ms
            .fetch_add(processing_time_ms, Ordering::Relaxed);
        self.release();
    }

    /// 工作项被中止，不计入已处理数
    pub fn task_aborted(&self) {
        self.release();
    }

    fn release(&self) {
        let _ = self
            .current_load
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |load| {
                Some(load.saturating_sub(1))
            });
    }

    pub fn tasks_processed(&self) -> u64 {
        self.tasks_processed.load(Ordering::Relaxed)
    }

    pub fn current_load(&self) -> u32 {
        self.current_load.load(Ordering::Relaxed)
    }

    pub fn avg_processing_time_ms(&self) -> f64 {
        let processed = self.tasks_processed();
        if processed == 0 {
            return 0.0;
        }
        self.total_processing_time_ms.load(Ordering::Relaxed) as f64 / processed as f64
    }

    pub fn snapshot(&self, worker_id: &str, is_available: bool) -> WorkerMetricsSnapshot {
        WorkerMetricsSnapshot {
            worker_id: worker_id.to_string(),
            tasks_processed: self.tasks_processed(),
            current_load: self.current_load(),
            avg_processing_time_ms: self.avg_processing_time_ms(),
            is_available,
        }
    }
}

/// 模拟执行一个工作项
///
/// 耗时从获得并发许可后开始计算，排队时间不计入 `processing_time_ms`。
pub async fn simulate(worker_id: &str, item: &WorkItem, profile: &SimulationProfile) -> TaskResult {
    let latency = profile.sample_latency();
    let failed = profile.should_fail();
    let started = Instant::now();

    tokio::time::sleep(latency).await;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    debug!(
        worker_id = worker_id,
        task_id = %item.task_id,
        elapsed_ms,
        failed,
        "模拟任务执行完成"
    );

    if failed {
        TaskResult {
            processing_time_ms: elapsed_ms,
            ..TaskResult::failure(
                item.task_id.as_str(),
                format!("Simulated failure on {worker_id}"),
            )
        }
    } else {
        TaskResult::success(
            item.task_id.as_str(),
            format!("Processed by {worker_id}"),
            elapsed_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::TaskPriority;
    use serde_json::json;

    fn profile(min: u64, max: u64, failure_rate: f64) -> SimulationProfile {
        SimulationProfile {
            min_latency_ms: min,
            max_latency_ms: max,
            failure_rate,
        }
    }

    fn item() -> WorkItem {
        WorkItem {
            task_id: "t-1".to_string(),
            payload: json!({"n": 1}),
            priority: TaskPriority::Normal,
        }
    }

    #[test]
    fn test_latency_stays_in_range() {
        let profile = profile(10, 20, 0.0);
        for _ in 0..200 {
            let latency = profile.sample_latency();
            assert!(latency >= Duration::from_millis(10));
            assert!(latency <= Duration::from_millis(20));
        }
        assert_eq!(self::profile(30, 5, 0.0).sample_latency(), Duration::from_millis(30));
    }

    #[test]
    fn test_failure_rate_extremes() {
        assert!((0..100).all(|_| !profile(0, 0, 0.0).should_fail()));
        assert!((0..100).all(|_| profile(0, 0, 1.0).should_fail()));
    }

    #[test]
    fn test_stats_accounting() {
        let stats = WorkerStats::new();
        stats.task_accepted();
        stats.task_accepted();
        stats.task_accepted();
        assert_eq!(stats.current_load(), 3);

        stats.task_finished(10);
        stats.task_finished(30);
        stats.task_aborted();

        let snapshot = stats.snapshot("w", true);
        assert_eq!(snapshot.tasks_processed, 2);
        assert_eq!(snapshot.current_load, 0);
        assert_eq!(snapshot.avg_processing_time_ms, 20.0);

        stats.task_aborted();
        assert_eq!(stats.current_load(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulate_reports_elapsed_time() {
        let result = simulate("worker-1", &item(), &profile(50, 50, 0.0)).await;
        assert!(result.success);
        assert_eq!(result.task_id, "t-1");
        assert_eq!(result.processing_time_ms, 50);
        assert_eq!(result.message, "Processed by worker-1");

        let failed = simulate("worker-1", &item(), &profile(5, 5, 1.0)).await;
        assert!(!failed.success);
        assert_eq!(failed.processing_time_ms, 5);
        assert_eq!(failed.message, "Simulated failure on worker-1");
    }
}
