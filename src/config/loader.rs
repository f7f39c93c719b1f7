use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// 环境变量前缀，嵌套字段用 `__` 分隔，例如 `CHATBOT_RESPONDER__SIMILARITY_THRESHOLD`
pub const ENV_PREFIX: &str = "CHATBOT_";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 搜索路径：
    /// 1. 内置默认值
    /// 2. ./chatbot.toml
    /// 3. 环境变量
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        let threshold = config.responder.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigValidationError::InvalidThreshold(threshold));
        }

        if config
            .responder
            .exit_commands
            .iter()
            .all(|command| command.trim().is_empty())
        {
            return Err(ConfigValidationError::MissingExitCommands);
        }

        if config.responder.fallback_messages.is_empty() {
            return Err(ConfigValidationError::MissingFallbackMessages);
        }

        if config.responder.max_clarification_options == 0 {
            return Err(ConfigValidationError::InvalidClarificationOptions);
        }

        if config.encyclopedia.enabled && config.encyclopedia.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        let encyclopedia = &config.encyclopedia;
        if encyclopedia.enabled && encyclopedia.lookup_timeout_secs < encyclopedia.timeout_secs {
            return Err(ConfigValidationError::InvalidLookupTimeout {
                lookup: encyclopedia.lookup_timeout_secs,
                request: encyclopedia.timeout_secs,
            });
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("相似度阈值无效，必须在 (0, 1] 区间内: {0}")]
    InvalidThreshold(f64),

    #[error("至少需要一个退出命令")]
    MissingExitCommands,

    #[error("至少需要一条兜底回复")]
    MissingFallbackMessages,

    #[error("歧义候选数必须大于 0")]
    InvalidClarificationOptions,

    #[error("百科请求超时必须大于 0")]
    InvalidTimeout,

    #[error("查询总超时 {lookup}s 不能小于单次请求超时 {request}s")]
    InvalidLookupTimeout { lookup: u64, request: u64 },
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("chatbot.toml")
}
