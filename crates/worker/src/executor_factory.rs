use router_config::models::WorkerConfig;
use router_core::{WorkerEventSender, WorkerFactory, WorkerHandle};
use tracing::debug;

use crate::service::SimulatedWorker;

/// 按统一配置创建模拟Worker
#[derive(Debug, Clone, Default)]
pub struct SimulatedWorkerFactory {
    config: WorkerConfig,
}

impl SimulatedWorkerFactory {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }
}

impl WorkerFactory for SimulatedWorkerFactory {
    fn spawn_worker(&self, worker_id: &str, events: WorkerEventSender) -> WorkerHandle {
        debug!(
            worker_id = worker_id,
            min_latency_ms = self.config.min_latency_ms,
            max_latency_ms = self.config.max_latency_ms,
            failure_rate = self.config.failure_rate,
            "创建模拟Worker"
        );
        SimulatedWorker::new(worker_id, &self.config, events).spawn()
    }
}
