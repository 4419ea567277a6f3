use std::io::Write;
use std::time::Duration;

use router_config::AppConfig;
use router_core::{Task, TaskPriority, TaskRouterService};
use serde_json::json;
use task_router::{Application, ShutdownManager};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_application_runs_until_shutdown() {
    let file = write_config(
        r#"
[dispatcher]
initial_pool_size = 3
routing_strategy = "least_loaded"

[worker]
min_latency_ms = 1
max_latency_ms = 5
failure_rate = 0.0

[api]
enabled = false
"#,
    );
    let config = AppConfig::load(file.path().to_str()).unwrap();

    let app = Application::new(config);
    let dispatcher = app.dispatcher();
    let shutdown = ShutdownManager::new();
    let shutdown_rx = shutdown.subscribe();
    let running = tokio::spawn(async move { app.run(shutdown_rx).await });

    let result = dispatcher
        .submit_task(Task::new("t-1", json!({"n": 1}), TaskPriority::Normal))
        .await
        .unwrap();
    assert!(result.success);

    let broadcast = dispatcher
        .broadcast_task(Task::new("t-2", json!({}), TaskPriority::Low))
        .await
        .unwrap();
    assert_eq!(broadcast.message, "All 3 workers succeeded");

    let metrics = dispatcher.get_metrics().await.unwrap();
    assert_eq!(metrics.worker_count, 3);
    assert_eq!(metrics.total_tasks_processed, 2);

    shutdown.shutdown();
    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert!(dispatcher.get_metrics().await.is_err());
}

#[tokio::test]
async fn test_application_serves_http_until_shutdown() {
    let file = write_config(
        r#"
[dispatcher]
initial_pool_size = 1

[worker]
min_latency_ms = 1
max_latency_ms = 1

[api]
enabled = true
bind_address = "127.0.0.1:0"
"#,
    );
    let config = AppConfig::load(file.path().to_str()).unwrap();
    let app = Application::new(config);
    let dispatcher = app.dispatcher();
    let shutdown = ShutdownManager::new();
    let shutdown_rx = shutdown.subscribe();
    let running = tokio::spawn(async move { app.run(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.shutdown();

    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(dispatcher.is_stopped());
}
