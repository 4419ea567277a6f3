use serde::{Deserialize, Serialize};

/// Worker指标快照
///
/// 按需刷新而非持续推送。没有快照的Worker按 `current_load = 0` 处理。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerMetricsSnapshot {
    pub worker_id: String,
    pub tasks_processed: u64,
    pub current_load: u32,
    pub avg_processing_time_ms: f64,
    pub is_available: bool,
}

impl WorkerMetricsSnapshot {
    /// 尚未查询过的Worker使用的默认快照
    pub fn unknown(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            tasks_processed: 0,
            current_load: 0,
            avg_processing_time_ms: 0.0,
            is_available: true,
        }
    }
}
