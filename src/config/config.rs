use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 应答器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// 意图匹配的最低相似度（包含边界）
    pub similarity_threshold: f64,
    /// 结束会话的命令
    pub exit_commands: Vec<String>,
    /// 退出命令的回复
    pub farewell_message: String,
    /// 交互会话因退出命令结束时打印的告别语
    pub session_farewell: String,
    /// 兜底回复
    pub fallback_messages: Vec<String>,
    /// 歧义时最多列出的候选数
    pub max_clarification_options: usize,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            exit_commands: vec!["exit".into(), "quit".into(), "bye".into()],
            farewell_message: "Goodbye! Have a nice day.".into(),
            session_farewell: "Goodbye! Have a great day.".into(),
            fallback_messages: vec![
                "I couldn't find information about that.".into(),
                "I'm not sure about that topic.".into(),
                "That's beyond my current knowledge.".into(),
            ],
            max_clarification_options: 3,
        }
    }
}

/// 百科服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncyclopediaConfig {
    /// 是否启用外部查询
    pub enabled: bool,
    /// 语言代码，决定 Wikipedia 站点
    pub language: String,
    /// 覆盖默认站点地址（测试或镜像）
    pub base_url: Option<String>,
    /// 单次 HTTP 请求超时（秒）
    pub timeout_secs: u64,
    /// 一次完整查询的超时（秒），覆盖搜索、摘要、歧义链接三次请求与限流等待
    pub lookup_timeout_secs: u64,
    /// 摘要保留的句子数
    pub summary_sentences: usize,
    /// 搜索结果条数
    pub search_limit: usize,
    /// 是否启用限流
    pub rate_limit_enabled: bool,
    /// 两次请求之间的最小间隔（毫秒）
    pub min_request_interval_ms: u64,
    /// User-Agent 请求头
    pub user_agent: String,
}

impl Default for EncyclopediaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en".into(),
            base_url: None,
            timeout_secs: 10,
            lookup_timeout_secs: 30,
            summary_sentences: 2,
            search_limit: 10,
            rate_limit_enabled: true,
            min_request_interval_ms: 50,
            user_agent: concat!("hybrid-chatbot/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl EncyclopediaConfig {
    /// 实际请求的站点地址
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.wikipedia.org", self.language),
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

/// 意图文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentsConfig {
    /// 显式指定的意图文件
    pub path: Option<PathBuf>,
    /// 未指定时依次尝试的候选路径
    pub search_paths: Vec<PathBuf>,
}

impl Default for IntentsConfig {
    fn default() -> Self {
        Self {
            path: None,
            search_paths: vec![
                PathBuf::from("intents_dataset_1000.json"),
                PathBuf::from("intents.json"),
            ],
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件目录，未设置时输出到 stderr
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            structured: false,
            log_dir: None,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 应答器配置
    pub responder: ResponderConfig,
    /// 百科服务配置
    pub encyclopedia: EncyclopediaConfig,
    /// 意图文件配置
    pub intents: IntentsConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".into();
        config
    }

    /// 离线配置，不访问外部百科
    pub fn offline() -> Self {
        let mut config = Self::default();
        config.encyclopedia.enabled = false;
        config
    }
}
