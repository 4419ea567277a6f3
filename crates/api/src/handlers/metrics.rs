use axum::{extract::State, response::IntoResponse};

use crate::{error::ApiResult, response::success, routes::AppState};

pub async fn get_metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(success(state.router.get_metrics().await?))
}
