//! Test data builders for creating tasks with sensible defaults

use router_core::{Task, TaskPriority};
use serde_json::{json, Value};

/// Builder for creating test Task values
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            task: Task {
                id: "test-task".to_string(),
                payload: json!({}),
                priority: TaskPriority::Normal,
            },
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.task.id = id.to_string();
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.task.payload = payload;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.task.priority = priority;
        self
    }

    pub fn urgent(self) -> Self {
        self.with_priority(TaskPriority::High)
    }

    pub fn build(self) -> Task {
        self.task
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create `count` normal-priority tasks with ids `{prefix}-0 .. {prefix}-{count-1}`
pub fn task_batch(prefix: &str, count: usize) -> Vec<Task> {
    (0..count)
        .map(|i| {
            TaskBuilder::new()
                .with_id(&format!("{prefix}-{i}"))
                .with_payload(json!({ "seq": i }))
                .build()
        })
        .collect()
}
