use metrics::{counter, gauge, histogram, Counter, Gauge, Histogram};
use router_core::DispatchMode;
use tracing::debug;

/// 路由器运行指标
///
/// 未安装全局recorder时所有记录都是空操作。
pub struct MetricsCollector {
    tasks_rejected_total: Counter,
    broadcasts_total: Counter,
    worker_pool_size: Gauge,
    tasks_in_progress: Gauge,
    task_processing_time: Histogram,
    scale_events_total: Counter,
    pending_tasks_evicted_total: Counter,
    late_results_total: Counter,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            tasks_rejected_total: counter!("router_tasks_rejected_total"),
            broadcasts_total: counter!("router_broadcasts_total"),
            worker_pool_size: gauge!("router_worker_pool_size"),
            tasks_in_progress: gauge!("router_tasks_in_progress"),
            task_processing_time: histogram!("router_task_processing_time_ms"),
            scale_events_total: counter!("router_scale_events_total"),
            pending_tasks_evicted_total: counter!("router_pending_tasks_evicted_total"),
            late_results_total: counter!("router_late_results_total"),
        }
    }

    pub fn record_task_submitted(&self, mode: DispatchMode, strategy: &'static str) {
        counter!("router_tasks_submitted_total", "mode" => mode.as_str(), "strategy" => strategy)
            .increment(1);
        if mode == DispatchMode::Broadcast {
            self.broadcasts_total.increment(1);
        }
    }

    pub fn record_task_completed(
        &self,
        mode: DispatchMode,
        success: bool,
        processing_time_ms: u64,
    ) {
        if success {
            counter!("router_tasks_completed_total", "mode" => mode.as_str()).increment(1);
        } else {
            counter!("router_tasks_failed_total", "mode" => mode.as_str()).increment(1);
        }
        self.task_processing_time.record(processing_time_ms as f64);
    }

    /// 没有可用Worker或任务ID重复时立即拒绝
    pub fn record_task_rejected(&self, reason: &str) {
        self.tasks_rejected_total.increment(1);
        debug!(reason = reason, "任务被拒绝");
    }

    pub fn record_scale(&self, new_size: usize) {
        self.scale_events_total.increment(1);
        self.worker_pool_size.set(new_size as f64);
    }

    pub fn update_pool_size(&self, size: usize) {
        self.worker_pool_size.set(size as f64);
    }

    pub fn update_tasks_in_progress(&self, count: usize) {
        self.tasks_in_progress.set(count as f64);
    }

    pub fn record_pending_evicted(&self, count: usize) {
        self.pending_tasks_evicted_total.increment(count as u64);
    }

    pub fn record_late_result(&self) {
        self.late_results_total.increment(1);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
