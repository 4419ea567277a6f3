use axum::{extract::State, response::IntoResponse, Json};
use router_core::RoutingStrategy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::ApiResult, response::ApiResponse, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct ChangeStrategyRequest {
    pub strategy: String,
}

#[derive(Debug, Serialize)]
pub struct StrategyChange {
    pub previous: RoutingStrategy,
    pub current: RoutingStrategy,
}

pub async fn change_strategy(
    State(state): State<AppState>,
    Json(request): Json<ChangeStrategyRequest>,
) -> ApiResult<impl IntoResponse> {
    let strategy: RoutingStrategy = request.strategy.parse()?;
    let previous = state.router.change_strategy(strategy).await?;
    info!("HTTP切换路由策略: {} -> {}", previous, strategy);

    Ok(ApiResponse::success_with_message(
        StrategyChange {
            previous,
            current: strategy,
        },
        format!("Routing strategy changed from {previous} to {strategy}"),
    ))
}
