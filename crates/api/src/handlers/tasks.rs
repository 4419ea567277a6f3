use axum::{extract::State, response::IntoResponse, Json};
use router_core::{Task, TaskPriority};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{error::ApiResult, response::success, routes::AppState};

/// 任务提交请求
///
/// 未提供 `id` 或为空白时生成UUID v4。
#[derive(Debug, Deserialize)]
pub struct SubmitTaskRequest {
    pub id: Option<String>,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub priority: TaskPriority,
}

impl SubmitTaskRequest {
    pub fn into_task(self) -> Task {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        Task::new(id, self.payload, self.priority)
    }
}

/// 按当前路由策略提交任务，等待最终结果
///
/// 业务失败（如无可用Worker）仍返回200，由结果中的 `success` 表达。
pub async fn submit_task(
    State(state): State<AppState>,
    Json(request): Json<SubmitTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let task = request.into_task();
    debug!(task_id = %task.id, priority = %task.priority, "HTTP提交任务");
    let result = state.router.submit_task(task).await?;
    Ok(success(result))
}

/// 广播任务到所有Worker，返回多数表决结果
pub async fn broadcast_task(
    State(state): State<AppState>,
    Json(request): Json<SubmitTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let task = request.into_task();
    debug!(task_id = %task.id, "HTTP广播任务");
    let result = state.router.broadcast_task(task).await?;
    Ok(success(result))
}
