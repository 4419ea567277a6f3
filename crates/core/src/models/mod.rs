//! # 数据模型
//!
//! 任务路由系统的核心数据结构：任务、工作项、执行结果、Worker指标快照、
//! 路由器指标以及路由策略。所有模型都实现了序列化，可直接用于HTTP接口。
//!
//! ## 生命周期
//!
//! ```text
//! Task ──提交──▶ Dispatcher ──投影──▶ WorkItem ×N ──▶ Worker
//!                    ▲                                   │
//!                    └────────── TaskResult ◀────────────┘
//! ```
//!
//! 单Worker模式下每个任务对应一个 `WorkItem`，广播模式下对应池中每个Worker一个。

pub mod metrics;
pub mod routing;
pub mod task;
pub mod worker;

pub use metrics::*;
pub use routing::*;
pub use task::*;
pub use worker::*;
