use serde::{Deserialize, Serialize};

use super::RoutingStrategy;

/// 路由器整体指标
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouterMetrics {
    pub total_tasks_processed: u64,
    pub tasks_in_progress: usize,
    pub average_processing_time_ms: f64,
    pub worker_count: usize,
    pub routing_strategy: RoutingStrategy,
}

/// 扩缩容结果。扩缩容从不失败，越界请求会被截断。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScaleResult {
    pub success: bool,
    pub new_size: usize,
    pub message: String,
}
