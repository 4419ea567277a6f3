use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, ObservabilityConfig},
    dispatcher_worker::{DispatcherConfig, WorkerConfig},
};
use crate::validation::ConfigValidator;

const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/router.toml",
    "router.toml",
    "/etc/task-router/config.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dispatcher: DispatcherConfig,
    pub worker: WorkerConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 加载配置：内置默认值 < TOML文件 < `ROUTER_` 前缀环境变量
    ///
    /// 显式指定的文件必须存在；未指定时按默认路径查找，都找不到则只用默认值。
    /// 嵌套字段的环境变量用双下划线分隔，如 `ROUTER_DISPATCHER__INITIAL_POOL_SIZE=8`。
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = AppConfig::default();
        let mut builder = ConfigBuilder::builder()
            .set_default(
                "dispatcher.initial_pool_size",
                defaults.dispatcher.initial_pool_size as i64,
            )?
            .set_default(
                "dispatcher.routing_strategy",
                defaults.dispatcher.routing_strategy.as_str(),
            )?
            .set_default(
                "dispatcher.metrics_timeout_ms",
                defaults.dispatcher.metrics_timeout_ms as i64,
            )?
            .set_default(
                "dispatcher.status_grace_period_ms",
                defaults.dispatcher.status_grace_period_ms as i64,
            )?
            .set_default(
                "dispatcher.mailbox_capacity",
                defaults.dispatcher.mailbox_capacity as i64,
            )?
            .set_default("worker.min_latency_ms", defaults.worker.min_latency_ms as i64)?
            .set_default("worker.max_latency_ms", defaults.worker.max_latency_ms as i64)?
            .set_default("worker.failure_rate", defaults.worker.failure_rate)?
            .set_default(
                "worker.max_concurrent_tasks",
                defaults.worker.max_concurrent_tasks as i64,
            )?
            .set_default("api.enabled", defaults.api.enabled)?
            .set_default("api.bind_address", defaults.api.bind_address.clone())?
            .set_default(
                "api.request_timeout_seconds",
                defaults.api.request_timeout_seconds as i64,
            )?
            .set_default("observability.log_level", defaults.observability.log_level.clone())?
            .set_default("observability.log_format", "pretty")?
            .set_default("observability.metrics_enabled", defaults.observability.metrics_enabled)?
            .set_default(
                "observability.prometheus_bind_address",
                defaults.observability.prometheus_bind_address.clone(),
            )?;

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("ROUTER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.dispatcher.validate()?;
        self.worker.validate()?;
        self.api.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}
