use router_core::{Task, TaskResult, WorkerHandle};
use tracing::debug;

/// 把任务发给池中每一个Worker，返回实际发出的工作项数量
///
/// 期望结果数由调用方在发出前按池大小确定，已退出的Worker不会减少它。
pub fn fan_out(task: &Task, workers: &[WorkerHandle]) -> usize {
    let sent = workers
        .iter()
        .filter(|worker| worker.dispatch(task.to_work_item()))
        .count();
    debug!(task_id = %task.id, sent, pool = workers.len(), "广播任务已发出");
    sent
}

/// 多数表决聚合
///
/// 成功数严格大于结果数的一半（整除）才算成功，偶数池恰好一半成功不算多数。
/// 平均耗时为整除结果，没有结果时为0。
pub fn aggregate(task_id: &str, results: &[TaskResult]) -> TaskResult {
    let total = results.len();
    let success_count = results.iter().filter(|r| r.success).count();
    let majority_success = success_count > total / 2;
    let avg_processing_time_ms = if total == 0 {
        0
    } else {
        results.iter().map(|r| r.processing_time_ms).sum::<u64>() / total as u64
    };

    let summary = if success_count == total {
        format!("All {total} workers succeeded")
    } else {
        format!("{success_count} out of {total} workers succeeded")
    };

    TaskResult {
        task_id: task_id.to_string(),
        success: majority_success,
        message: summary,
        processing_time_ms: avg_processing_time_ms,
    }
}
