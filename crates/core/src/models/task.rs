use serde::{Deserialize, Serialize};

/// 任务优先级
///
/// 优先级路由策略按优先级把任务分到Worker池的前半段或后半段：
/// `Critical`/`High` 走前半段，`Normal`/`Low` 走后半段。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TaskPriority {
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "NORMAL")]
    #[default]
    Normal,
    #[serde(rename = "LOW")]
    Low,
}

impl TaskPriority {
    /// 是否路由到Worker池的前半段
    pub fn is_urgent(&self) -> bool {
        matches!(self, TaskPriority::Critical | TaskPriority::High)
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskPriority::Critical => "CRITICAL",
            TaskPriority::High => "HIGH",
            TaskPriority::Normal => "NORMAL",
            TaskPriority::Low => "LOW",
        };
        write!(f, "{s}")
    }
}

/// 任务分发模式：单Worker或广播
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    Single,
    Broadcast,
}

impl DispatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMode::Single => "single",
            DispatchMode::Broadcast => "broadcast",
        }
    }
}

/// 调用方提交的任务
///
/// 提交后不可变。回复通道不属于任务本身，由分发器命令携带。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub payload: serde_json::Value,
    #[serde(default)]
    pub priority: TaskPriority,
}

impl Task {
    pub fn new(id: impl Into<String>, payload: serde_json::Value, priority: TaskPriority) -> Self {
        Self {
            id: id.into(),
            payload,
            priority,
        }
    }

    /// 投影为发送给Worker的工作项
    pub fn to_work_item(&self) -> WorkItem {
        WorkItem {
            task_id: self.id.clone(),
            payload: self.payload.clone(),
            priority: self.priority,
        }
    }
}

/// 发送给单个Worker的工作项，每个 (任务, Worker) 对一个
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkItem {
    pub task_id: String,
    pub payload: serde_json::Value,
    pub priority: TaskPriority,
}

/// 任务执行结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskResult {
    pub task_id: String,
    pub success: bool,
    pub message: String,
    pub processing_time_ms: u64,
}

impl TaskResult {
    pub fn success(
        task_id: impl Into<String>,
        message: impl Into<String>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            success: true,
            message: message.into(),
            processing_time_ms,
        }
    }

    /// 未经过Worker处理的失败结果，耗时记为0
    pub fn failure(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            success: false,
            message: message.into(),
            processing_time_ms: 0,
        }
    }
}
