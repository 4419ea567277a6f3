use std::collections::HashMap;
use std::time::Duration;

use router_core::{DispatchMode, Task, TaskResult};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;

/// 挂起任务条目
///
/// 每个在途任务ID恰好一个条目，`collected_results.len() <= expected_count`。
#[derive(Debug)]
pub struct PendingTaskEntry {
    pub task: Task,
    pub mode: DispatchMode,
    pub collected_results: Vec<TaskResult>,
    pub expected_count: usize,
    pub submitted_at: Instant,
    reply: oneshot::Sender<TaskResult>,
}

impl PendingTaskEntry {
    pub fn new(
        task: Task,
        mode: DispatchMode,
        expected_count: usize,
        reply: oneshot::Sender<TaskResult>,
    ) -> Self {
        Self {
            task,
            mode,
            collected_results: Vec::with_capacity(expected_count),
            expected_count,
            submitted_at: Instant::now(),
            reply,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task.id
    }

    pub fn is_complete(&self) -> bool {
        self.collected_results.len() >= self.expected_count
    }

    /// 回复原始调用方。调用方已放弃等待时返回 `false`
    pub fn reply(self, result: TaskResult) -> bool {
        self.reply.send(result).is_ok()
    }
}

/// 挂起任务台账
///
/// 由分发器循环独占，无需加锁。条目只在收齐结果或超时淘汰时移除。
#[derive(Debug, Default)]
pub struct PendingTaskLedger {
    entries: HashMap<String, PendingTaskEntry>,
}

impl PendingTaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记新条目。任务ID已存在时拒绝，原条目保持不变，新条目原样退回
    pub fn register(&mut self, entry: PendingTaskEntry) -> Result<(), PendingTaskEntry> {
        if self.entries.contains_key(entry.task_id()) {
            return Err(entry);
        }
        debug!(
            task_id = entry.task_id(),
            mode = entry.mode.as_str(),
            expected = entry.expected_count,
            "登记挂起任务"
        );
        self.entries.insert(entry.task.id.clone(), entry);
        Ok(())
    }

    /// 记录一个结果。收齐后移除并返回该条目，未知任务ID直接忽略
    pub fn record_result(&mut self, task_id: &str, result: TaskResult) -> Option<PendingTaskEntry> {
        let entry = self.entries.get_mut(task_id)?;
        entry.collected_results.push(result);
        if entry.is_complete() {
            self.entries.remove(task_id)
        } else {
            None
        }
    }

    /// 移除已挂起超过 `timeout` 的条目
    pub fn evict_expired(&mut self, now: Instant, timeout: Duration) -> Vec<PendingTaskEntry> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.submitted_at) >= timeout)
            .map(|(id, _)| id.clone())
            .collect();

        expired
            .iter()
            .filter_map(|id| self.entries.remove(id))
            .collect()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.entries.contains_key(task_id)
    }

    pub fn get(&self, task_id: &str) -> Option<&PendingTaskEntry> {
        self.entries.get(task_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
