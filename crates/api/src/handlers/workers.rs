use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::{error::ApiResult, response::ApiResponse, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct ScaleRequest {
    pub delta: i64,
}

/// 查询Worker状态，最多等待一个宽限期
pub async fn list_workers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let statuses = state.router.get_worker_statuses().await?;
    Ok(ApiResponse::success(statuses))
}

/// 调整Worker池大小，结果始终落在合法范围内
pub async fn scale_workers(
    State(state): State<AppState>,
    Json(request): Json<ScaleRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state.router.scale_workers(request.delta).await?;
    let message = result.message.clone();
    Ok(ApiResponse::success_with_message(result, message))
}
