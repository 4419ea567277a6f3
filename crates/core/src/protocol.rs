//! Worker侧通信协议
//!
//! 分发器向Worker发送 [`WorkerCommand`]，Worker通过事件通道异步回报 [`WorkerEvent`]。
//! 发送工作项对分发器来说是即发即弃的，不会阻塞分发器主循环。

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::models::{TaskResult, WorkItem, WorkerMetricsSnapshot};

/// 分发器发往Worker的命令
#[derive(Debug)]
pub enum WorkerCommand {
    /// 处理一个工作项，最终产生恰好一个 `WorkerEvent::Completed`
    Dispatch(WorkItem),
    /// 请求一份指标快照
    RequestMetrics(oneshot::Sender<WorkerMetricsSnapshot>),
    /// 优雅停止，之后不再产生任何事件
    Stop,
}

/// Worker回报给分发器的事件
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Completed {
        task_id: String,
        worker_id: String,
        result: TaskResult,
    },
}

/// Worker事件的发送端，由工厂在创建Worker时交给Worker
pub type WorkerEventSender = mpsc::UnboundedSender<WorkerEvent>;

/// Worker句柄，由分发器的Worker注册表独占持有
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    id: String,
    commands: mpsc::UnboundedSender<WorkerCommand>,
}

impl WorkerHandle {
    pub fn new(id: impl Into<String>, commands: mpsc::UnboundedSender<WorkerCommand>) -> Self {
        Self {
            id: id.into(),
            commands,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 发送工作项。Worker已退出时返回 `false`，工作项被丢弃
    pub fn dispatch(&self, item: WorkItem) -> bool {
        match self.commands.send(WorkerCommand::Dispatch(item)) {
            Ok(()) => true,
            Err(e) => {
                warn!(worker_id = %self.id, "Worker已退出，丢弃工作项: {:?}", e.0);
                false
            }
        }
    }

    /// 请求指标快照。Worker已退出时接收端会立即返回错误
    pub fn request_metrics(&self) -> oneshot::Receiver<WorkerMetricsSnapshot> {
        let (tx, rx) = oneshot::channel();
        let _ = self.commands.send(WorkerCommand::RequestMetrics(tx));
        rx
    }

    pub fn stop(&self) {
        let _ = self.commands.send(WorkerCommand::Stop);
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}
