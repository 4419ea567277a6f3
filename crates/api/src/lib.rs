//! # Router API
//!
//! 任务路由器的HTTP接口，基于Axum构建，把分发器的命令协议暴露为JSON端点。
//!
//! ## API 端点
//!
//! - `GET /health` - 健康检查
//! - `POST /api/tasks` - 按当前策略提交任务并等待结果
//! - `POST /api/tasks/broadcast` - 广播任务，返回多数表决结果
//! - `GET /api/workers` - 查询Worker状态
//! - `POST /api/workers/scale` - 调整Worker池大小
//! - `GET /api/metrics` - 路由器指标
//! - `PUT /api/strategy` - 切换路由策略
//!
//! 成功响应统一为 `{success, data, message, timestamp}`。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use router_config::models::ApiConfig;
use router_core::TaskRouterService;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

use middleware::{cors_layer, request_logging, trace_layer};
use routes::{create_routes, AppState};

pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;

/// 创建完整的API应用
pub fn create_app(router: Arc<dyn TaskRouterService>, api_config: &ApiConfig) -> Router {
    let state = AppState { router };

    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(cors_layer())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(api_config.request_timeout_seconds),
            ))
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
