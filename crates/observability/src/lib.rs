//! # Router Observability
//!
//! 日志初始化与运行指标导出。
//!
//! - [`telemetry_setup`]: 基于 `tracing-subscriber` 的日志初始化，支持 json / pretty / compact 三种格式，
//!   `RUST_LOG` 环境变量优先于配置中的日志级别
//! - [`metrics_collector`]: 基于 `metrics` 宏的路由器指标，可选安装 Prometheus 导出器

pub mod metrics_collector;
pub mod telemetry_setup;

pub use metrics_collector::MetricsCollector;
pub use telemetry_setup::{init_logging, init_metrics};
