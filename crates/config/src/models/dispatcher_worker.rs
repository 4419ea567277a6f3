use router_core::RoutingStrategy;
use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

/// Worker池大小上限
pub const MAX_POOL_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// 启动时创建的Worker数量，允许为0（此时所有提交立即失败）
    pub initial_pool_size: usize,
    pub routing_strategy: RoutingStrategy,
    /// 单个Worker指标请求的超时时间
    pub metrics_timeout_ms: u64,
    /// 查询Worker状态时等待指标刷新的宽限期
    pub status_grace_period_ms: u64,
    pub mailbox_capacity: usize,
    /// 挂起任务超时淘汰，缺省时不淘汰
    pub pending_task_timeout_ms: Option<u64>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            initial_pool_size: 5,
            routing_strategy: RoutingStrategy::RoundRobin,
            metrics_timeout_ms: 100,
            status_grace_period_ms: 150,
            mailbox_capacity: 1024,
            pending_task_timeout_ms: None,
        }
    }
}

impl ConfigValidator for DispatcherConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_range(
            self.initial_pool_size,
            0,
            MAX_POOL_SIZE,
            "dispatcher.initial_pool_size",
        )?;
        ValidationUtils::validate_timeout_ms(
            self.metrics_timeout_ms,
            "dispatcher.metrics_timeout_ms",
        )?;
        ValidationUtils::validate_timeout_ms(
            self.status_grace_period_ms,
            "dispatcher.status_grace_period_ms",
        )?;
        if self.mailbox_capacity == 0 {
            return Err(crate::ConfigError::Validation(
                "dispatcher.mailbox_capacity must be greater than 0".to_string(),
            ));
        }
        if let Some(timeout_ms) = self.pending_task_timeout_ms {
            ValidationUtils::validate_timeout_ms(timeout_ms, "dispatcher.pending_task_timeout_ms")?;
        }
        Ok(())
    }
}

/// 模拟Worker配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    /// 失败概率，0.0 ~ 1.0
    pub failure_rate: f64,
    pub max_concurrent_tasks: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: 10,
            max_latency_ms: 200,
            failure_rate: 0.1,
            max_concurrent_tasks: 4,
        }
    }
}

impl ConfigValidator for WorkerConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        if self.min_latency_ms > self.max_latency_ms {
            return Err(crate::ConfigError::Validation(format!(
                "worker.min_latency_ms ({}) must not exceed worker.max_latency_ms ({})",
                self.min_latency_ms, self.max_latency_ms
            )));
        }
        ValidationUtils::validate_range(self.failure_rate, 0.0, 1.0, "worker.failure_rate")?;
        ValidationUtils::validate_range(
            self.max_concurrent_tasks,
            1,
            10_000,
            "worker.max_concurrent_tasks",
        )?;
        Ok(())
    }
}
