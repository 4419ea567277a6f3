use std::sync::Arc;

use router_config::models::MAX_POOL_SIZE;
use router_core::{ScaleResult, WorkerEventSender, WorkerFactory};
use tracing::info;

use crate::registry::WorkerRegistry;

/// 扩缩容后的最小池大小
pub const MIN_POOL_SIZE: usize = 1;

/// Worker池扩缩容
///
/// 通过工厂创建Worker并交给注册表；缩容时从尾部移除并发送停止信号。
pub struct PoolScaler {
    factory: Arc<dyn WorkerFactory>,
    events: WorkerEventSender,
    next_worker_seq: u64,
}

impl PoolScaler {
    pub fn new(factory: Arc<dyn WorkerFactory>, events: WorkerEventSender) -> Self {
        Self {
            factory,
            events,
            next_worker_seq: 1,
        }
    }

    /// 创建一个Worker追加到池尾，返回其ID
    pub fn add_worker(&mut self, registry: &mut WorkerRegistry) -> String {
        let worker_id = format!("worker-{}", self.next_worker_seq);
        self.next_worker_seq += 1;
        let handle = self.factory.spawn_worker(&worker_id, self.events.clone());
        registry.push(handle);
        worker_id
    }

    /// 移除池尾Worker并发送停止信号
    pub fn remove_worker(&mut self, registry: &mut WorkerRegistry) -> Option<String> {
        let handle = registry.pop()?;
        handle.stop();
        Some(handle.id().to_string())
    }

    /// 按增量调整池大小，目标值截断到 `[1, 100]`，从不失败
    pub fn scale(&mut self, registry: &mut WorkerRegistry, delta: i64) -> ScaleResult {
        let current = registry.len();
        let target = clamp_target(current, delta);

        if target > current {
            for _ in current..target {
                self.add_worker(registry);
            }
        } else {
            for _ in target..current {
                self.remove_worker(registry);
            }
        }

        let message = if target == current {
            format!("Worker pool unchanged at {current} workers")
        } else {
            format!("Scaled worker pool from {current} to {target} workers")
        };
        info!(requested_delta = delta, current, target, "{}", message);

        ScaleResult {
            success: true,
            new_size: registry.len(),
            message,
        }
    }
}

/// `clamp(current + delta, 1, 100)`
pub fn clamp_target(current: usize, delta: i64) -> usize {
    let requested = (current as i64).saturating_add(delta);
    requested.clamp(MIN_POOL_SIZE as i64, MAX_POOL_SIZE as i64) as usize
}
