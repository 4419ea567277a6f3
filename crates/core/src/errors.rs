use thiserror::Error;

/// 路由器错误类型定义
///
/// 业务层面的失败（无可用Worker、任务超时等）以 `TaskResult { success: false }` 表达，
/// 不走错误通道。
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("分发器已停止")]
    DispatcherStopped,

    #[error("无效的路由策略: {0}")]
    InvalidStrategy(String),
}

/// 统一的Result类型
pub type RouterResult<T> = std::result::Result<T, RouterError>;
