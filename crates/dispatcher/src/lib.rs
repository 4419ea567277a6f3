//! 任务分发器
//!
//! 持有动态Worker池，按路由策略把任务分给单个Worker或广播给全部Worker，
//! 在挂起任务台账中关联异步回报的结果，最终给每个调用方恰好一个 `TaskResult`。
//!
//! 所有可变状态都由 [`Dispatcher`] 的单写者循环独占，外部只通过 [`DispatcherHandle`] 交互。

pub mod broadcast;
pub mod dispatcher;
pub mod ledger;
pub mod metrics_reporter;
pub mod registry;
pub mod scaler;
pub mod strategies;

#[cfg(test)]
mod strategies_test;

pub use dispatcher::{Dispatcher, DispatcherCommand, DispatcherHandle, DispatcherState};
pub use ledger::{PendingTaskEntry, PendingTaskLedger};
pub use metrics_reporter::MetricsReporter;
pub use registry::WorkerRegistry;
pub use scaler::{clamp_target, PoolScaler, MIN_POOL_SIZE};
pub use strategies::{DispatchStrategy, StrategySelector};
