use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use router_core::RouterError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("路由器错误: {0}")]
    Router(#[from] RouterError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type) = match &self {
            ApiError::Router(RouterError::DispatcherStopped) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "任务分发器已停止".to_string(),
                "DISPATCHER_STOPPED",
            ),
            ApiError::Router(RouterError::InvalidStrategy(name)) => (
                StatusCode::BAD_REQUEST,
                format!("无效的路由策略: {name}"),
                "INVALID_STRATEGY",
            ),
        };

        if status.is_server_error() {
            tracing::error!("请求处理失败: {}", self);
        }

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_dispatcher_maps_to_unavailable() {
        let response = ApiError::from(RouterError::DispatcherStopped).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_invalid_strategy_maps_to_bad_request() {
        let response =
            ApiError::from(RouterError::InvalidStrategy("fastest".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_error_display() {
        let error = ApiError::from(RouterError::DispatcherStopped);
        assert_eq!(format!("{error}"), "路由器错误: 分发器已停止");
    }
}
