//! 模拟Worker
//!
//! 满足分发器的Worker协议：接收工作项，经过随机延迟后按失败率产生恰好一个结果，
//! 应答指标请求，收到停止信号后中止在途任务且不再产生任何事件。

pub mod executor_factory;
pub mod service;
pub mod task_execution;

pub use executor_factory::SimulatedWorkerFactory;
pub use service::SimulatedWorker;
pub use task_execution::{SimulationProfile, WorkerStats};
