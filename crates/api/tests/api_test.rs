use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use router_api::create_app;
use router_config::models::{ApiConfig, DispatcherConfig};
use router_core::{RoutingStrategy, TaskRouterService};
use router_dispatcher::{Dispatcher, DispatcherHandle};
use router_testing_utils::{ScriptedWorkerFactory, WorkerScript};
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup(pool_size: usize, factory: ScriptedWorkerFactory) -> (Router, DispatcherHandle) {
    let config = DispatcherConfig {
        initial_pool_size: pool_size,
        routing_strategy: RoutingStrategy::RoundRobin,
        ..DispatcherConfig::default()
    };
    let handle = Dispatcher::spawn(config, Arc::new(factory));
    let app = create_app(Arc::new(handle.clone()), &ApiConfig::default());
    (app, handle)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _handle) = setup(1, ScriptedWorkerFactory::succeeding());

    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "task-router");
}

#[tokio::test]
async fn test_submit_task_with_explicit_id() {
    let (app, _handle) = setup(2, ScriptedWorkerFactory::succeeding());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({"id": "order-1", "payload": {"sku": 42}, "priority": "HIGH"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["task_id"], "order-1");
    assert_eq!(body["data"]["success"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_submit_task_generates_id() {
    let (app, _handle) = setup(1, ScriptedWorkerFactory::succeeding());

    let (status, body) = call(&app, Method::POST, "/api/tasks", Some(json!({"payload": 1}))).await;

    assert_eq!(status, StatusCode::OK);
    let task_id = body["data"]["task_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(task_id).is_ok());
}

#[tokio::test]
async fn test_submit_task_without_workers_reports_failure_in_body() {
    let (app, _handle) = setup(0, ScriptedWorkerFactory::succeeding());

    let (status, body) = call(&app, Method::POST, "/api/tasks", Some(json!({"id": "x"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], false);
    assert_eq!(body["data"]["message"], "No available workers");
}

#[tokio::test]
async fn test_broadcast_endpoint() {
    let factory = ScriptedWorkerFactory::succeeding().with_script("worker-2", WorkerScript::fail());
    let (app, _handle) = setup(3, factory);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/tasks/broadcast",
        Some(json!({"id": "vote"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["message"], "2 out of 3 workers succeeded");
}

#[tokio::test]
async fn test_scale_and_list_workers() {
    let (app, _handle) = setup(2, ScriptedWorkerFactory::succeeding());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/workers/scale",
        Some(json!({"delta": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["new_size"], 3);
    assert_eq!(body["message"], "Scaled worker pool from 2 to 3 workers");

    let (status, body) = call(&app, Method::GET, "/api/workers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_scale_beyond_i32_range_is_clamped() {
    let (app, _handle) = setup(5, ScriptedWorkerFactory::succeeding());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/workers/scale",
        Some(json!({"delta": -5_000_000_000_i64})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["new_size"], 1);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/workers/scale",
        Some(json!({"delta": 5_000_000_000_i64})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["new_size"], 100);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _handle) = setup(2, ScriptedWorkerFactory::succeeding());
    call(&app, Method::POST, "/api/tasks", Some(json!({"id": "m-1"}))).await;

    let (status, body) = call(&app, Method::GET, "/api/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_tasks_processed"], 1);
    assert_eq!(body["data"]["worker_count"], 2);
    assert_eq!(body["data"]["routing_strategy"], "round_robin");
}

#[tokio::test]
async fn test_change_strategy() {
    let (app, handle) = setup(2, ScriptedWorkerFactory::succeeding());

    let (status, body) = call(
        &app,
        Method::PUT,
        "/api/strategy",
        Some(json!({"strategy": "least-loaded"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["previous"], "round_robin");
    assert_eq!(body["data"]["current"], "least_loaded");

    let metrics = handle.get_metrics().await.unwrap();
    assert_eq!(metrics.routing_strategy, RoutingStrategy::LeastLoaded);

    let (status, body) = call(
        &app,
        Method::PUT,
        "/api/strategy",
        Some(json!({"strategy": "fastest"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "INVALID_STRATEGY");
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let config = DispatcherConfig {
        initial_pool_size: 1,
        ..DispatcherConfig::default()
    };
    let handle = Dispatcher::spawn(
        config,
        Arc::new(ScriptedWorkerFactory::new(WorkerScript::silent())),
    );
    let api_config = ApiConfig {
        request_timeout_seconds: 1,
        ..ApiConfig::default()
    };
    let app = create_app(Arc::new(handle), &api_config);

    let (status, _) = call(&app, Method::POST, "/api/tasks", Some(json!({"id": "slow"}))).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_stopped_dispatcher_returns_unavailable() {
    let (app, handle) = setup(1, ScriptedWorkerFactory::succeeding());
    handle.shutdown().await.unwrap();

    let (status, body) = call(&app, Method::POST, "/api/tasks", Some(json!({"id": "late"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "DISPATCHER_STOPPED");
}
