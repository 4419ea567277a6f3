use std::collections::HashMap;

use router_core::{WorkerHandle, WorkerMetricsSnapshot};
use tracing::debug;

/// Worker句柄注册表
///
/// 维护有序的Worker列表和每个Worker最近一次的指标快照。
/// 顺序对轮询和优先级半区路由有意义：新Worker追加到尾部，缩容从尾部移除。
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    workers: Vec<WorkerHandle>,
    snapshots: HashMap<String, WorkerMetricsSnapshot>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: WorkerHandle) {
        debug!(worker_id = handle.id(), "Worker加入池");
        self.workers.push(handle);
    }

    /// 移除尾部Worker及其快照，不负责发送停止信号
    pub fn pop(&mut self) -> Option<WorkerHandle> {
        let handle = self.workers.pop()?;
        self.snapshots.remove(handle.id());
        debug!(worker_id = handle.id(), "Worker移出池");
        Some(handle)
    }

    pub fn workers(&self) -> &[WorkerHandle] {
        &self.workers
    }

    pub fn get(&self, index: usize) -> Option<&WorkerHandle> {
        self.workers.get(index)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// 更新快照。已被移出池的Worker的迟到快照直接丢弃
    pub fn update_snapshot(&mut self, snapshot: WorkerMetricsSnapshot) -> bool {
        if !self.workers.iter().any(|w| w.id() == snapshot.worker_id) {
            debug!(worker_id = %snapshot.worker_id, "忽略已移除Worker的指标快照");
            return false;
        }
        self.snapshots.insert(snapshot.worker_id.clone(), snapshot);
        true
    }

    pub fn snapshot(&self, worker_id: &str) -> Option<&WorkerMetricsSnapshot> {
        self.snapshots.get(worker_id)
    }

    /// 指定位置Worker的已知负载，没有快照时为0
    pub fn load_at(&self, index: usize) -> u32 {
        self.workers
            .get(index)
            .and_then(|w| self.snapshots.get(w.id()))
            .map(|s| s.current_load)
            .unwrap_or(0)
    }

    /// 按池内顺序返回已有的快照
    pub fn snapshots(&self) -> Vec<WorkerMetricsSnapshot> {
        self.workers
            .iter()
            .filter_map(|w| self.snapshots.get(w.id()).cloned())
            .collect()
    }

    /// 清空注册表并交出全部句柄
    pub fn drain(&mut self) -> Vec<WorkerHandle> {
        self.snapshots.clear();
        std::mem::take(&mut self.workers)
    }
}
