use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use router_config::models::DispatcherConfig;
use router_core::{
    DispatchMode, RouterError, RouterMetrics, RouterResult, RoutingStrategy, ScaleResult, Task,
    TaskResult, TaskRouterService, WorkerEvent, WorkerFactory, WorkerMetricsSnapshot,
};
use router_observability::MetricsCollector;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::broadcast::{aggregate, fan_out};
use crate::ledger::{PendingTaskEntry, PendingTaskLedger};
use crate::metrics_reporter::{spawn_refresh, MetricsReporter};
use crate::registry::WorkerRegistry;
use crate::scaler::PoolScaler;
use crate::strategies::StrategySelector;

/// 淘汰扫描的最小间隔
const MIN_EVICTION_TICK: Duration = Duration::from_millis(10);

/// 分发器命令，经有界邮箱送入分发器循环
#[derive(Debug)]
pub enum DispatcherCommand {
    SubmitTask {
        task: Task,
        reply: oneshot::Sender<TaskResult>,
    },
    BroadcastTask {
        task: Task,
        reply: oneshot::Sender<TaskResult>,
    },
    ScaleWorkers {
        delta: i64,
        reply: oneshot::Sender<ScaleResult>,
    },
    GetMetrics {
        reply: oneshot::Sender<RouterMetrics>,
    },
    GetWorkerStatuses {
        reply: oneshot::Sender<Vec<WorkerMetricsSnapshot>>,
    },
    ChangeStrategy {
        strategy: RoutingStrategy,
        reply: oneshot::Sender<RoutingStrategy>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// 分发器循环内部事件，来自后台的指标刷新任务
enum InternalEvent {
    MetricsRefreshed(Vec<WorkerMetricsSnapshot>),
    StatusReady(oneshot::Sender<Vec<WorkerMetricsSnapshot>>),
}

/// 分发器生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Running,
    Stopped,
}

/// 任务分发器
///
/// 单写者事件循环：Worker注册表、挂起任务台账和策略游标都只在本循环内修改，
/// 外部通过 [`DispatcherHandle`] 发送命令并等待单次回复。
/// 向Worker发送工作项是即发即弃的，循环只在指标刷新时依赖后台任务回送结果，自身从不阻塞。
pub struct Dispatcher {
    config: DispatcherConfig,
    state: DispatcherState,
    strategy: RoutingStrategy,
    registry: WorkerRegistry,
    ledger: PendingTaskLedger,
    selector: StrategySelector,
    scaler: PoolScaler,
    reporter: MetricsReporter,
    metrics: MetricsCollector,
    internal_tx: mpsc::UnboundedSender<InternalEvent>,
}

impl Dispatcher {
    /// 创建初始Worker池并启动分发器循环，需要在Tokio运行时内调用
    pub fn spawn(config: DispatcherConfig, factory: Arc<dyn WorkerFactory>) -> DispatcherHandle {
        let (command_tx, command_rx) = mpsc::channel(config.mailbox_capacity.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        let mut dispatcher = Dispatcher {
            state: DispatcherState::Running,
            strategy: config.routing_strategy,
            registry: WorkerRegistry::new(),
            ledger: PendingTaskLedger::new(),
            selector: StrategySelector::new(),
            scaler: PoolScaler::new(factory, event_tx),
            reporter: MetricsReporter::new(),
            metrics: MetricsCollector::new(),
            internal_tx,
            config,
        };

        for _ in 0..dispatcher.config.initial_pool_size {
            dispatcher.scaler.add_worker(&mut dispatcher.registry);
        }
        dispatcher.metrics.update_pool_size(dispatcher.registry.len());

        info!(
            workers = dispatcher.registry.len(),
            strategy = %dispatcher.strategy,
            "任务分发器启动"
        );

        tokio::spawn(dispatcher.run(command_rx, event_rx, internal_rx));

        DispatcherHandle { commands: command_tx }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<DispatcherCommand>,
        mut events: mpsc::UnboundedReceiver<WorkerEvent>,
        mut internal: mpsc::UnboundedReceiver<InternalEvent>,
    ) {
        let eviction_timeout = self.config.pending_task_timeout_ms.map(Duration::from_millis);
        let mut eviction_tick = eviction_timeout.map(|timeout| {
            let mut tick = interval((timeout / 2).max(MIN_EVICTION_TICK));
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tick
        });

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        info!("所有分发器句柄已释放");
                        self.shutdown();
                    }
                },
                Some(event) = events.recv() => self.handle_worker_event(event),
                Some(event) = internal.recv() => self.handle_internal_event(event),
                _ = next_tick(&mut eviction_tick) => {
                    if let Some(timeout) = eviction_timeout {
                        self.evict_expired(timeout);
                    }
                }
            }

            if self.state == DispatcherState::Stopped {
                break;
            }
        }

        info!(
            abandoned = self.ledger.len(),
            total_processed = self.reporter.total_tasks_processed(),
            "任务分发器已停止"
        );
    }

    fn handle_command(&mut self, command: DispatcherCommand) {
        match command {
            DispatcherCommand::SubmitTask { task, reply } => {
                if self.strategy == RoutingStrategy::Broadcast {
                    self.broadcast_task(task, reply);
                } else {
                    self.submit_task(task, reply);
                }
            }
            DispatcherCommand::BroadcastTask { task, reply } => self.broadcast_task(task, reply),
            DispatcherCommand::ScaleWorkers { delta, reply } => {
                let _ = reply.send(self.scale_workers(delta));
            }
            DispatcherCommand::GetMetrics { reply } => {
                let _ = reply.send(self.router_metrics());
            }
            DispatcherCommand::GetWorkerStatuses { reply } => self.worker_statuses(reply),
            DispatcherCommand::ChangeStrategy { strategy, reply } => {
                let previous = std::mem::replace(&mut self.strategy, strategy);
                info!("路由策略切换: {} -> {}", previous, strategy);
                let _ = reply.send(previous);
            }
            DispatcherCommand::Shutdown { reply } => {
                self.shutdown();
                let _ = reply.send(());
            }
        }
    }

    fn submit_task(&mut self, task: Task, reply: oneshot::Sender<TaskResult>) {
        if self.registry.is_empty() {
            self.reject(task, reply, "No available workers");
            return;
        }

        if self.ledger.contains(&task.id) {
            self.reject(task, reply, "Duplicate task id");
            return;
        }

        if self.strategy == RoutingStrategy::LeastLoaded {
            self.refresh_metrics();
        }

        let Some(index) = self.selector.select(self.strategy, &task, &self.registry) else {
            self.reject(task, reply, "No available workers");
            return;
        };
        let Some(worker) = self.registry.get(index).cloned() else {
            self.reject(task, reply, "No available workers");
            return;
        };

        let item = task.to_work_item();
        let entry = PendingTaskEntry::new(task, DispatchMode::Single, 1, reply);
        if self.ledger.register(entry).is_err() {
            return;
        }

        debug!(
            task_id = %item.task_id,
            worker_id = worker.id(),
            strategy = %self.strategy,
            "分发任务"
        );
        worker.dispatch(item);
        self.metrics
            .record_task_submitted(DispatchMode::Single, self.strategy.as_str());
        self.metrics.update_tasks_in_progress(self.ledger.len());
    }

    fn broadcast_task(&mut self, task: Task, reply: oneshot::Sender<TaskResult>) {
        if self.registry.is_empty() {
            self.reject(task, reply, "No available workers");
            return;
        }

        let expected_count = self.registry.len();
        let entry =
            PendingTaskEntry::new(task.clone(), DispatchMode::Broadcast, expected_count, reply);
        if let Err(entry) = self.ledger.register(entry) {
            warn!(task_id = %task.id, "任务被拒绝: Duplicate task id");
            self.metrics.record_task_rejected("Duplicate task id");
            entry.reply(TaskResult::failure(task.id, "Duplicate task id"));
            return;
        }

        fan_out(&task, self.registry.workers());
        self.metrics
            .record_task_submitted(DispatchMode::Broadcast, RoutingStrategy::Broadcast.as_str());
        self.metrics.update_tasks_in_progress(self.ledger.len());
    }

    fn reject(&self, task: Task, reply: oneshot::Sender<TaskResult>, reason: &str) {
        warn!(task_id = %task.id, "任务被拒绝: {}", reason);
        self.metrics.record_task_rejected(reason);
        let _ = reply.send(TaskResult::failure(task.id, reason));
    }

    fn handle_worker_event(&mut self, event: WorkerEvent) {
        let WorkerEvent::Completed {
            task_id,
            worker_id,
            result,
        } = event;

        if !self.ledger.contains(&task_id) {
            debug!(task_id = %task_id, worker_id = %worker_id, "丢弃无对应挂起任务的结果");
            self.metrics.record_late_result();
            return;
        }

        debug!(
            task_id = %task_id,
            worker_id = %worker_id,
            success = result.success,
            "收到Worker结果"
        );
        let Some(mut entry) = self.ledger.record_result(&task_id, result) else {
            return;
        };

        let mode = entry.mode;
        let mut results = std::mem::take(&mut entry.collected_results);
        let final_result = match mode {
            DispatchMode::Single => results
                .pop()
                .unwrap_or_else(|| TaskResult::failure(task_id.as_str(), "Missing worker result")),
            DispatchMode::Broadcast => aggregate(&task_id, &results),
        };

        self.reporter.record(&final_result);
        self.metrics.record_task_completed(
            mode,
            final_result.success,
            final_result.processing_time_ms,
        );
        self.metrics.update_tasks_in_progress(self.ledger.len());

        if !entry.reply(final_result) {
            debug!(task_id = %task_id, "调用方已放弃等待结果");
        }
    }

    fn handle_internal_event(&mut self, event: InternalEvent) {
        match event {
            InternalEvent::MetricsRefreshed(snapshots) => {
                let received = snapshots.len();
                let mut applied = 0;
                for snapshot in snapshots {
                    if self.registry.update_snapshot(snapshot) {
                        applied += 1;
                    }
                }
                debug!(received, applied, "Worker指标快照已更新");
            }
            InternalEvent::StatusReady(reply) => {
                let _ = reply.send(self.registry.snapshots());
            }
        }
    }

    /// 触发一次后台指标刷新，回复经内部事件通道回到本循环
    fn refresh_metrics(&self) {
        let internal_tx = self.internal_tx.clone();
        spawn_refresh(
            self.registry.workers(),
            Duration::from_millis(self.config.metrics_timeout_ms),
            move |snapshots| {
                let _ = internal_tx.send(InternalEvent::MetricsRefreshed(snapshots));
            },
        );
    }

    fn worker_statuses(&self, reply: oneshot::Sender<Vec<WorkerMetricsSnapshot>>) {
        self.refresh_metrics();

        let grace = Duration::from_millis(self.config.status_grace_period_ms);
        let internal_tx = self.internal_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = internal_tx.send(InternalEvent::StatusReady(reply));
        });
    }

    fn scale_workers(&mut self, delta: i64) -> ScaleResult {
        let result = self.scaler.scale(&mut self.registry, delta);
        self.selector.on_pool_resized(self.registry.len());
        self.metrics.record_scale(result.new_size);
        result
    }

    fn router_metrics(&self) -> RouterMetrics {
        self.reporter
            .router_metrics(self.ledger.len(), self.registry.len(), self.strategy)
    }

    fn evict_expired(&mut self, timeout: Duration) {
        let expired = self.ledger.evict_expired(Instant::now(), timeout);
        if expired.is_empty() {
            return;
        }

        warn!(count = expired.len(), "挂起任务超时淘汰");
        self.metrics.record_pending_evicted(expired.len());
        for entry in expired {
            let task_id = entry.task.id.clone();
            entry.reply(TaskResult::failure(task_id, "Task timed out"));
        }
        self.metrics.update_tasks_in_progress(self.ledger.len());
    }

    /// 向所有Worker发送停止信号并进入终止状态
    ///
    /// 挂起条目不做清理，循环退出时随台账一起丢弃，等待中的调用方收到 `DispatcherStopped`。
    fn shutdown(&mut self) {
        if self.state == DispatcherState::Stopped {
            return;
        }

        let workers = self.registry.drain();
        info!(workers = workers.len(), pending = self.ledger.len(), "关闭任务分发器");
        for worker in workers {
            worker.stop();
        }
        self.metrics.update_pool_size(0);
        self.state = DispatcherState::Stopped;
    }
}

async fn next_tick(tick: &mut Option<Interval>) {
    match tick {
        Some(tick) => {
            tick.tick().await;
        }
        None => pending::<()>().await,
    }
}

/// 分发器句柄
///
/// 可克隆，在多个请求方之间共享。分发器停止后所有调用返回 [`RouterError::DispatcherStopped`]。
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    commands: mpsc::Sender<DispatcherCommand>,
}

impl DispatcherHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> DispatcherCommand,
    ) -> RouterResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .await
            .map_err(|_| RouterError::DispatcherStopped)?;
        reply_rx.await.map_err(|_| RouterError::DispatcherStopped)
    }

    pub fn is_stopped(&self) -> bool {
        self.commands.is_closed()
    }
}

#[async_trait]
impl TaskRouterService for DispatcherHandle {
    async fn submit_task(&self, task: Task) -> RouterResult<TaskResult> {
        self.request(|reply| DispatcherCommand::SubmitTask { task, reply })
            .await
    }

    async fn broadcast_task(&self, task: Task) -> RouterResult<TaskResult> {
        self.request(|reply| DispatcherCommand::BroadcastTask { task, reply })
            .await
    }

    async fn scale_workers(&self, delta: i64) -> RouterResult<ScaleResult> {
        self.request(|reply| DispatcherCommand::ScaleWorkers { delta, reply })
            .await
    }

    async fn get_metrics(&self) -> RouterResult<RouterMetrics> {
        self.request(|reply| DispatcherCommand::GetMetrics { reply })
            .await
    }

    async fn get_worker_statuses(&self) -> RouterResult<Vec<WorkerMetricsSnapshot>> {
        self.request(|reply| DispatcherCommand::GetWorkerStatuses { reply })
            .await
    }

    async fn change_strategy(&self, strategy: RoutingStrategy) -> RouterResult<RoutingStrategy> {
        self.request(|reply| DispatcherCommand::ChangeStrategy { strategy, reply })
            .await
    }

    async fn shutdown(&self) -> RouterResult<()> {
        match self
            .request(|reply| DispatcherCommand::Shutdown { reply })
            .await
        {
            Err(RouterError::DispatcherStopped) => Ok(()),
            other => other,
        }
    }
}
