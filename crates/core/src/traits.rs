use async_trait::async_trait;

use crate::{
    models::{RouterMetrics, RoutingStrategy, ScaleResult, Task, TaskResult, WorkerMetricsSnapshot},
    protocol::{WorkerEventSender, WorkerHandle},
    RouterResult,
};

/// Worker工厂
///
/// 扩容时由分发器调用。返回的句柄被注册表独占持有，Worker通过 `events` 回报结果。
pub trait WorkerFactory: Send + Sync {
    fn spawn_worker(&self, worker_id: &str, events: WorkerEventSender) -> WorkerHandle;
}

/// 任务路由服务接口
///
/// 与传输层无关的命令协议，HTTP前端等外层通过它访问分发器。
#[async_trait]
pub trait TaskRouterService: Send + Sync {
    /// 按当前路由策略提交任务
    async fn submit_task(&self, task: Task) -> RouterResult<TaskResult>;

    /// 广播任务到所有Worker并返回多数表决结果
    async fn broadcast_task(&self, task: Task) -> RouterResult<TaskResult>;

    /// 调整Worker池大小
    async fn scale_workers(&self, delta: i64) -> RouterResult<ScaleResult>;

    /// 获取路由器指标
    async fn get_metrics(&self) -> RouterResult<RouterMetrics>;

    /// 获取各Worker指标快照
    async fn get_worker_statuses(&self) -> RouterResult<Vec<WorkerMetricsSnapshot>>;

    /// 切换路由策略，返回之前的策略
    async fn change_strategy(&self, strategy: RoutingStrategy) -> RouterResult<RoutingStrategy>;

    /// 关闭分发器
    async fn shutdown(&self) -> RouterResult<()>;
}
