use std::sync::Arc;

use anyhow::{Context, Result};
use router_api::create_app;
use router_config::AppConfig;
use router_core::TaskRouterService;
use router_dispatcher::{Dispatcher, DispatcherHandle};
use router_worker::SimulatedWorkerFactory;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

/// 主应用程序
///
/// 启动分发器和模拟Worker池，按配置启动HTTP服务。
/// 关闭顺序：先停止HTTP服务，再关闭分发器。
pub struct Application {
    config: AppConfig,
    dispatcher: DispatcherHandle,
}

impl Application {
    /// 创建应用实例，需要在Tokio运行时内调用
    pub fn new(config: AppConfig) -> Self {
        info!(
            workers = config.dispatcher.initial_pool_size,
            strategy = %config.dispatcher.routing_strategy,
            "初始化任务路由器"
        );

        let factory = Arc::new(SimulatedWorkerFactory::new(config.worker.clone()));
        let dispatcher = Dispatcher::spawn(config.dispatcher.clone(), factory);

        Self { config, dispatcher }
    }

    /// 分发器句柄，可在进程内直接提交任务
    pub fn dispatcher(&self) -> DispatcherHandle {
        self.dispatcher.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 运行直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        if self.config.api.enabled {
            self.run_api(shutdown_rx.resubscribe()).await?;
        } else {
            info!("API服务器已禁用");
            let _ = shutdown_rx.recv().await;
        }

        info!("关闭任务分发器");
        self.dispatcher
            .shutdown()
            .await
            .context("关闭任务分发器失败")?;

        info!("任务路由器已停止");
        Ok(())
    }

    async fn run_api(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let router: Arc<dyn TaskRouterService> = Arc::new(self.dispatcher.clone());
        let app = create_app(router, &self.config.api);

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;

        info!("API服务器启动在 http://{}", self.config.api.bind_address);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        info!("API服务器已停止");
        Ok(())
    }
}
