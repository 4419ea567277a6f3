pub mod errors;
pub mod models;
pub mod protocol;
pub mod traits;

pub use errors::*;
pub use models::{
    DispatchMode, RouterMetrics, RoutingStrategy, ScaleResult, Task, TaskPriority, TaskResult,
    WorkItem, WorkerMetricsSnapshot,
};
pub use protocol::{WorkerCommand, WorkerEvent, WorkerEventSender, WorkerHandle};
pub use traits::{TaskRouterService, WorkerFactory};
