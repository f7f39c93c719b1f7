//! 错误处理模块
//!
//! 定义应用程序的错误类型和错误处理逻辑。

use thiserror::Error;

use crate::encyclopedia::EncyclopediaError;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 意图库加载失败
    #[error("意图库加载失败: {0}")]
    IntentStore(String),

    /// 意图文件不存在
    #[error("意图文件不存在: {0}")]
    IntentFileNotFound(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 百科查询错误
    #[error("百科查询错误: {0}")]
    Encyclopedia(#[from] EncyclopediaError),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Encyclopedia(EncyclopediaError::from(e))
    }
}

impl AppError {
    /// 是否为启动阶段的致命错误
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::IntentStore(_)
                | AppError::IntentFileNotFound(_)
                | AppError::Config(_)
                | AppError::Serialization(_)
        )
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;
